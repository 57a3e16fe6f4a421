//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `process` - Statement extraction to JSON
//! - `rules` - Keyword rules inspection
//! - `serve` - Web server command

pub mod process;
pub mod rules;
pub mod serve;

// Re-export command functions for main.rs
pub use process::*;
pub use rules::*;
pub use serve::*;

use std::path::Path;

use anyhow::{Context, Result};
use ledger_core::{pipeline, AIClient, KeywordRules, StatementParser, StatementProcessor};

/// Load keyword rules from an explicit path, or the default resolution
pub fn load_rules(rules_path: Option<&Path>) -> Result<KeywordRules> {
    match rules_path {
        Some(path) => KeywordRules::from_path(path)
            .with_context(|| format!("Failed to load rules from {}", path.display())),
        None => KeywordRules::load().context("Failed to load keyword rules"),
    }
}

/// Build the statement processor from rules and environment
pub fn build_processor(rules_path: Option<&Path>, offline: bool) -> Result<StatementProcessor> {
    let parser = StatementParser::new(load_rules(rules_path)?)
        .context("Failed to build statement parser")?;
    let ai = if offline { None } else { AIClient::from_env() };
    Ok(StatementProcessor::new(
        parser,
        ai,
        pipeline::ai_timeout_from_env(),
    ))
}
