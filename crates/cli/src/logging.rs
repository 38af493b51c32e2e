//! Tracing setup for the binary
//!
//! Two layers share one registry:
//! - console (stderr, compact): `warn` by default, `debug` with `--verbose`
//! - log file (`<work_dir>/diradmin.log`, appended, no ANSI): `info` by
//!   default, `debug` with `--verbose`
//!
//! `RUST_LOG`, when set, replaces both defaults.

use std::path::Path;

use diradmin_domain::constants::LOG_FILE_NAME;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

const fn console_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

const fn file_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. The returned guard flushes the log file
/// when dropped and must live until the process exits.
///
/// # Errors
/// Returns an error when the log directory cannot be created.
pub fn init_tracing(work_dir: &Path, verbose: bool) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(work_dir)?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(work_dir, LOG_FILE_NAME));

    let console = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter(console_level(verbose)));
    let file = fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(filter(file_level(verbose)));

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(console).with(file).try_init();
    Ok(guard)
}
