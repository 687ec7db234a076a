//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `gowitness_hive` library that handles:
//! - Environment variable loading (.env file)
//! - Command-line argument parsing
//! - Logger initialization
//! - The process exit status
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use gowitness_hive::config::Opt;
use gowitness_hive::initialization::init_logger_with;
use gowitness_hive::{run_import, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // HIVE_URL / HIVE_PROJECT_ID may come from .env, in the current directory
    // or next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::from(Opt::parse());

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    match run_import(config).await {
        Ok(report) => {
            let summary = &report.reconciliation;
            println!(
                "Imported {} screenshot{} into project {} ({} created, {} appended, {} skipped) in {:.1}s",
                summary.succeeded(),
                if summary.succeeded() == 1 { "" } else { "s" },
                report.project_id,
                summary.notes_created,
                summary.notes_appended,
                summary.failed(),
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("gowitness_hive error: {}", e);
            process::exit(1);
        }
    }
}
