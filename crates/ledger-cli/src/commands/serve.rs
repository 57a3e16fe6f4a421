//! Server command implementation

use std::path::Path;

use anyhow::Result;
use ledger_core::StatementExtractor;
use ledger_server::ServerConfig;

use super::build_processor;

pub async fn cmd_serve(
    rules_path: Option<&Path>,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    let processor = build_processor(rules_path, false)?;
    let config = ServerConfig::from_env();

    println!("🚀 Starting Ledger web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Keyword rules: {}",
        processor.parser().rules().source
    );
    match processor.ai() {
        Some(ai) => println!("   AI extraction: {} ({})", ai.host(), ai.model()),
        None => println!("   AI extraction: disabled (offline parser only)"),
    }
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !config.allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {} (LEDGER_ALLOWED_ORIGINS)",
            config.allowed_origins.join(", ")
        );
    }
    println!();

    let static_dir = static_dir.map(|p| p.to_string_lossy().to_string());
    ledger_server::serve(processor, host, port, static_dir.as_deref(), config).await
}
