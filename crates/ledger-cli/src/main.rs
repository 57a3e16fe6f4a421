//! Ledger CLI - Bank statement transaction extractor
//!
//! Usage:
//!   ledger process --file statement.txt   Extract transactions as JSON
//!   ledger serve --port 3000              Start web server
//!   ledger rules                          Show keyword rules

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so `process` output stays pipeable
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    match cli.command {
        Commands::Process {
            file,
            offline,
            pretty,
        } => commands::cmd_process(cli.rules.as_deref(), &file, offline, pretty).await,
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            commands::cmd_serve(cli.rules.as_deref(), &host, port, static_dir.as_deref()).await
        }
        Commands::Rules => commands::cmd_rules(cli.rules.as_deref()),
    }
}
