//! Statement processing orchestrator
//!
//! One entry point turns statement text into transactions: the AI stage
//! when a client is configured, the heuristic parser otherwise or whenever
//! the AI stage fails. Exactly one strategy's output is returned per call;
//! results are never merged.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ai::{AIClient, ExtractionError, StatementExtractor};
use crate::error::Result;
use crate::models::Transaction;
use crate::rules::KeywordRules;
use crate::statement::StatementParser;
use crate::validate::finalize;

/// Default bound on one AI extraction call
pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(60);

/// Which strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    Ai,
    Heuristic,
}

impl ExtractionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Heuristic => "heuristic",
        }
    }
}

/// Records plus how they were obtained
#[derive(Debug, Clone)]
pub struct ProcessedStatement {
    pub transactions: Vec<Transaction>,
    pub source: ExtractionSource,
    /// Set when the AI stage was attempted and failed
    pub fallback_reason: Option<ExtractionError>,
}

/// AI-first statement processor with heuristic fallback
///
/// Cheap to clone and safe to share across request handlers.
#[derive(Debug, Clone)]
pub struct StatementProcessor {
    parser: StatementParser,
    ai: Option<AIClient>,
    timeout: Duration,
}

impl StatementProcessor {
    pub fn new(parser: StatementParser, ai: Option<AIClient>, timeout: Duration) -> Self {
        Self { parser, ai, timeout }
    }

    /// Build from environment: keyword rules, AI credentials and timeout
    ///
    /// Fails only on systemic problems such as an invalid rules file.
    pub fn from_env() -> Result<Self> {
        let parser = StatementParser::new(KeywordRules::load()?)?;
        Ok(Self::new(parser, AIClient::from_env(), ai_timeout_from_env()))
    }

    /// Processor that never calls out to a model
    pub fn heuristic_only() -> Result<Self> {
        Ok(Self::new(
            StatementParser::with_default_rules()?,
            None,
            DEFAULT_AI_TIMEOUT,
        ))
    }

    /// Drop the AI client (e.g. for `--offline`)
    pub fn without_ai(mut self) -> Self {
        self.ai = None;
        self
    }

    pub fn ai(&self) -> Option<&AIClient> {
        self.ai.as_ref()
    }

    pub fn ai_configured(&self) -> bool {
        self.ai.is_some()
    }

    pub fn parser(&self) -> &StatementParser {
        &self.parser
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Extract transactions from statement text; never fails
    pub async fn process(&self, text: &str) -> Vec<Transaction> {
        self.process_detailed(text).await.transactions
    }

    /// Like [`process`](Self::process), also reporting which strategy ran
    pub async fn process_detailed(&self, text: &str) -> ProcessedStatement {
        let Some(ai) = &self.ai else {
            debug!("No AI backend configured, using heuristic parser");
            return self.heuristic(text, None);
        };

        match self.extract_with_ai(ai, text).await {
            Ok(transactions) => {
                info!(
                    model = ai.model(),
                    count = transactions.len(),
                    "Extracted transactions with AI"
                );
                ProcessedStatement {
                    transactions,
                    source: ExtractionSource::Ai,
                    fallback_reason: None,
                }
            }
            Err(e) => {
                warn!(
                    model = ai.model(),
                    host = ai.host(),
                    reason = e.kind(),
                    error = %e,
                    "AI extraction failed, falling back to heuristic parser"
                );
                self.heuristic(text, Some(e))
            }
        }
    }

    async fn extract_with_ai(
        &self,
        ai: &AIClient,
        text: &str,
    ) -> std::result::Result<Vec<Transaction>, ExtractionError> {
        let raw = tokio::time::timeout(self.timeout, ai.extract_transactions(text))
            .await
            .map_err(|_| ExtractionError::Timeout(self.timeout))??;

        let returned = raw.len();
        let transactions: Vec<Transaction> = raw.into_iter().filter_map(finalize).collect();

        if returned > 0 && transactions.is_empty() {
            return Err(ExtractionError::SchemaMismatch(format!(
                "all {} records failed validation",
                returned
            )));
        }
        if transactions.len() < returned {
            debug!(
                returned,
                kept = transactions.len(),
                "Dropped invalid AI records"
            );
        }

        Ok(transactions)
    }

    fn heuristic(&self, text: &str, reason: Option<ExtractionError>) -> ProcessedStatement {
        ProcessedStatement {
            transactions: self.parser.parse(text),
            source: ExtractionSource::Heuristic,
            fallback_reason: reason,
        }
    }
}

/// `LEDGER_AI_TIMEOUT_SECS`, or the default when unset/invalid
pub fn ai_timeout_from_env() -> Duration {
    match std::env::var("LEDGER_AI_TIMEOUT_SECS") {
        Ok(v) => match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(value = %v, "Invalid LEDGER_AI_TIMEOUT_SECS, using default");
                DEFAULT_AI_TIMEOUT
            }
        },
        Err(_) => DEFAULT_AI_TIMEOUT,
    }
}
