//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ledger - Extract transactions from bank statements
#[derive(Parser)]
#[command(name = "ledger")]
#[command(about = "Bank statement transaction extractor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Keyword rules file (overrides LEDGER_RULES_PATH and the data dir override)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract transactions from a statement file and print them as JSON
    Process {
        /// Statement text file
        #[arg(short, long)]
        file: PathBuf,

        /// Skip the AI stage and use the offline parser only
        #[arg(long)]
        offline: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show the effective keyword rules and where they came from
    Rules,
}
