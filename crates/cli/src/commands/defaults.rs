//! `set-default-domain` and `ls-customer-id`

use diradmin_domain::{AppConfig, Result};
use diradmin_infra::{DomainDefaults, WorkDir};

use super::Outcome;
use crate::cli::SetDefaultDomainArgs;
use crate::session::Session;

/// Look up the customer id of `args.domain` and store both as defaults.
pub async fn set_default_domain(config: AppConfig, args: &SetDefaultDomainArgs) -> Result<Outcome> {
    // Fail before any API call when the file would not be written anyway.
    WorkDir::check_overwrite(&WorkDir::new(&config.work_dir).default_domain_path(), args.force)?;

    let session = Session::open(config, &args.domain).await?;
    let customer_id = session.users().customer_id(&session.domain).await?;

    let defaults =
        DomainDefaults { domain: session.domain.clone(), customer_id: Some(customer_id) };
    let path = session.work.save_default_domain(&defaults, args.force).await?;
    println!("Default domain stored in {}.", path.display());
    Ok(Outcome::Success)
}

pub async fn ls_customer_id(session: &Session) -> Result<Outcome> {
    let customer_id = session.users().customer_id(&session.domain).await?;
    println!("CustomerId for {}:", session.domain);
    println!("{customer_id}");
    Ok(Outcome::Success)
}
