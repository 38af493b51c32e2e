//! Domain types and models

pub mod scan;
pub mod token;
pub mod user;

pub use scan::{ScanCursor, ScanOutcome, ScanReport, ScanState, ScanStatus};
pub use token::{OAuthToken, StatKey, TokenList};
pub use user::{DirectoryUser, NewUser, UserName, UserPage, UserSummary};
