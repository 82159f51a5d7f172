//! S3 Restore Tool
//!
//! Restores deleted objects of a version-enabled S3 bucket, either by copying
//! the previous version over the delete marker or by removing the marker itself.

// s3-restore/src/main.rs
mod cli;
mod config;
mod errors;
mod restore;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::AppConfig;
use std::process::ExitCode;
use storage::S3VersionStore;
use tracing_subscriber::EnvFilter;

/// Main entry point for the restore tool
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run_app(&cli).await {
        Ok(_) => {
            println!("✅ Operation completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

async fn run_app(cli: &Cli) -> Result<()> {
    // Credentials may come from a local .env, alongside the usual AWS provider chain.
    dotenv::dotenv().ok();

    // Configuration problems (missing bucket, bad since date) abort before any backend call.
    let app_config = AppConfig::from_cli(cli).context("Failed to load restore configuration")?;
    if app_config.dryrun {
        println!("🔍 Dry run: no objects will be modified.");
    }

    let store = S3VersionStore::connect(&app_config.storage).await;
    let report = restore::run_restore_flow(&app_config, &store)
        .await
        .context("Restore process failed")?;

    if app_config.dryrun {
        for entry in report.plan.iter() {
            println!("  would restore {} (version {})", entry.key, entry.version_id);
        }
    }
    let summary = report.summary;

    if summary.failed > 0 {
        eprintln!(
            "⚠️ {} of {} objects could not be restored, see the log for details.",
            summary.failed, summary.planned
        );
    }
    Ok(())
}
