//! Application constants
//!
//! Centralized location for defaults, remote endpoints and the names of the
//! files kept in the work directory.

// Remote endpoints
pub const DEFAULT_API_BASE_URL: &str = "https://admin.googleapis.com";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DIRECTORY_USERS_PATH: &str = "/admin/directory/v1/users";
pub const DEFAULT_USER_AGENT: &str = concat!("diradmin/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Retry defaults (2^n seconds, bounded)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 64_000;

// Listing and checkpointing
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 500;
/// Commit after every entity so a killed run never repeats finished work
pub const DEFAULT_CHECKPOINT_EVERY: u32 = 1;
pub const SCAN_STATE_VERSION: u32 = 1;

// Credentials refresh this long before expiry
pub const TOKEN_REFRESH_THRESHOLD_SECS: i64 = 300;

// Delay before re-reading a user after add/remove
pub const VERIFY_SETTLE_SECS: u64 = 2;

// Work directory layout
pub const DEFAULT_WORK_DIR: &str = "working";
pub const LOG_FILE_NAME: &str = "diradmin.log";
pub const CLIENT_SECRETS_FILE: &str = "client_secrets.json";
pub const CREDENTIALS_FILE: &str = "credentials.json";
pub const DEFAULT_DOMAIN_FILE: &str = "default_domain.json";
pub const USERS_FILE: &str = "users.json";
pub const TOP_CLIENT_IDS_CSV: &str = "top_client_ids.csv";
pub const TOP_SCOPES_CSV: &str = "top_scopes.csv";

// Scan names (state file is `<name>_scan.json`)
pub const COLLECTION_SCAN: &str = "collection";
pub const REVOCATION_SCAN: &str = "revocation";

// Vendor quirk: token deletion for an absent client sometimes answers 500
pub const NO_TOKENS_MESSAGE: &str = "No tokens exist for the specified client id";
