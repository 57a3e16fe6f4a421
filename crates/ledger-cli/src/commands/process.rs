//! Process command implementation

use std::path::Path;

use anyhow::{Context, Result};
use ledger_core::StatementProcessor;
use tracing::info;

use super::build_processor;

pub async fn cmd_process(
    rules_path: Option<&Path>,
    file: &Path,
    offline: bool,
    pretty: bool,
) -> Result<()> {
    let processor = build_processor(rules_path, offline)?;
    let json = process_file(&processor, file, pretty).await?;
    println!("{}", json);
    Ok(())
}

/// Read a statement file and render its transactions as JSON
pub async fn process_file(
    processor: &StatementProcessor,
    file: &Path,
    pretty: bool,
) -> Result<String> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read statement {}", file.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let result = processor.process_detailed(&text).await;
    info!(
        file = %file.display(),
        count = result.transactions.len(),
        source = result.source.as_str(),
        "Processed statement"
    );

    let json = if pretty {
        serde_json::to_string_pretty(&result.transactions)?
    } else {
        serde_json::to_string(&result.transactions)?
    };
    Ok(json)
}
