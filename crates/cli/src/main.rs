//! `diradmin` binary entry point

#![allow(clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use diradmin_cli::{logging, Cli, Outcome};
use diradmin_infra::config;
use tracing::error;

async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let mut config = config::load(cli.config.clone()).context("loading configuration")?;
    if let Some(dir) = cli.work_dir.clone() {
        config.work_dir = dir;
    }

    let _guard = logging::init_tracing(&config.work_dir, cli.verbose)
        .with_context(|| format!("creating work dir {}", config.work_dir.display()))?;

    let outcome = diradmin_cli::run(cli, config).await.map_err(|err| {
        error!(error = %err, "command failed");
        err
    })?;
    Ok(outcome)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
