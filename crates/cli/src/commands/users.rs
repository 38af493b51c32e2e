//! User management commands

use diradmin_domain::{DirAdminError, NewUser, Result, UserSummary};
use diradmin_infra::WorkDir;

use super::{print_lines, Outcome};
use crate::cli::{AddUserArgs, LsUserArgs, LsUsersArgs, RmUserArgs};
use crate::report;
use crate::session::Session;

pub async fn ls_users(session: &Session, args: &LsUsersArgs) -> Result<Outcome> {
    if args.json {
        WorkDir::check_overwrite(&session.work.users_path(&session.domain), args.force)?;
    }

    let max_results = (args.first_n > 0).then_some(args.first_n);
    let users = session
        .users()
        .list_users(
            &session.domain,
            session.config.scan.page_size,
            max_results,
            args.query.as_deref(),
        )
        .await?;

    if args.json {
        let summaries: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();
        let path = session.work.save_users(&session.domain, &summaries, args.force).await?;
        println!("Users list written to {}.", path.display());
        return Ok(Outcome::Success);
    }

    println!("Users from domain {}:", session.domain);
    println!("{}", report::user_header());
    print_lines(users.iter().map(report::user_row));
    println!("{} users found.", users.len());
    Ok(Outcome::Success)
}

pub async fn ls_user(session: &Session, args: &LsUserArgs) -> Result<Outcome> {
    let Some(user) = session.users().get_user(&args.user).await? else {
        return Err(DirAdminError::NotFound(format!("user {}", args.user)));
    };
    println!("{}", report::user_header());
    println!("{}", report::user_row(&user));
    if args.long {
        print_lines(report::user_details(&user));
    }
    Ok(Outcome::Success)
}

pub async fn add_user(session: &Session, args: &AddUserArgs) -> Result<Outcome> {
    let new_user = NewUser::new(
        args.user.as_str(),
        args.first.as_str(),
        args.last.as_str(),
        args.password.as_str(),
    );
    let user = session.users().add_user(&new_user, args.verify).await?;
    println!("User {} added.", user.primary_email);
    println!("{}", report::user_header());
    println!("{}", report::user_row(&user));
    Ok(Outcome::Success)
}

pub async fn rm_user(session: &Session, args: &RmUserArgs) -> Result<Outcome> {
    if !args.force {
        return Err(DirAdminError::InvalidInput(format!(
            "rm-user permanently deletes {}; pass --force to confirm",
            args.user
        )));
    }
    session.users().remove_user(&args.user, args.verify).await?;
    println!("User {} removed.", args.user);
    Ok(Outcome::Success)
}
