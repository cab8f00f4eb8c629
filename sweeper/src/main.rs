//! JMX Sweep Entry Point

use clap::Parser;
use jmx_sweep::cli::Cli;
use jmx_sweep::{logging, sweep};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = cli.into_config();

    match sweep::run_sweep(&config).await {
        Ok(summary) => {
            info!(
                sweep_id = %summary.sweep_id,
                instances = summary.instances,
                checks = summary.checks,
                failures = summary.failures,
                delivered = summary.delivered,
                "Sweep completed"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Sweep failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
