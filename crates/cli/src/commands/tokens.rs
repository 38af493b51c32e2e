//! Per-user token commands

use diradmin_common::{validate_client_id, validate_email};
use diradmin_core::TokensApi;
use diradmin_domain::{DirAdminError, Result};

use super::{print_lines, Outcome};
use crate::cli::{LsTokensArgs, RevokeTokenArgs};
use crate::report;
use crate::session::Session;

fn checked_email(email: &str) -> Result<&str> {
    validate_email(email).map_err(|e| DirAdminError::InvalidInput(e.to_string()))
}

pub(crate) fn checked_client_id(client_id: &str) -> Result<&str> {
    validate_client_id(client_id).map_err(|e| DirAdminError::InvalidInput(e.to_string()))
}

pub async fn ls_tokens(session: &Session, args: &LsTokensArgs) -> Result<Outcome> {
    let email = checked_email(&args.user)?;
    if session.users().get_user(email).await?.is_none() {
        return Err(DirAdminError::NotFound(format!("user {email}")));
    }

    match args.client_id.as_deref() {
        Some(client_id) => {
            let client_id = checked_client_id(client_id)?;
            match session.api.get_token(email, client_id).await? {
                Some(token) => print_lines(report::token_lines(&[token], args.long)),
                None => println!("No tokens found for that user and client_id."),
            }
        }
        None => {
            let tokens = session.api.list_tokens(email).await?;
            if tokens.is_empty() {
                println!("No tokens found for that user.");
            } else {
                print_lines(report::token_lines(&tokens, args.long));
            }
        }
    }
    Ok(Outcome::Success)
}

pub async fn revoke_token(session: &Session, args: &RevokeTokenArgs) -> Result<Outcome> {
    let email = checked_email(&args.user)?;
    let client_id = checked_client_id(&args.client_id)?;

    if session.api.delete_token(email, client_id).await? {
        println!("Revoked the token {email} granted to {client_id}.");
    } else {
        println!("{email} holds no token for {client_id}.");
    }
    Ok(Outcome::Success)
}
