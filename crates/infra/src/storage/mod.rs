//! Local file storage: atomic JSON documents, scan state and the working
//! directory layout.

pub mod atomic;
pub mod scan_store;
pub mod workspace;

pub use atomic::{read_json, remove_if_exists, write_bytes_atomic, write_json_atomic};
pub use scan_store::JsonScanStore;
pub use workspace::{DomainDefaults, WorkDir};
