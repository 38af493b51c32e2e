//! Resumable batch iteration over domain entities
//!
//! A batch run lists entities page by page, applies a processor to each one
//! and checkpoints the cursor together with the result cache so that an
//! interrupted run picks up after the last committed entity.

pub mod ports;
pub mod runner;
pub mod sources;

pub use ports::{EntityPage, EntityProcessor, EntitySource, ScanEntity, ScanStore};
pub use runner::{BatchRunner, ScanOptions, ScanRun};
