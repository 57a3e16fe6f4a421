//! Ledger Core Library
//!
//! Bank statement transaction extraction for the Ledger service:
//! - AI extraction through an OpenAI-compatible chat completions API
//! - Deterministic regex/keyword parser used as the offline fallback
//! - Keyword rules for categories, payment methods and credit markers
//! - Shared validation so every record honors the same invariants
//! - Prompt library for a customizable extraction prompt
//! - Orchestrator that picks a strategy and degrades silently

pub mod ai;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod rules;
pub mod statement;
pub mod validate;

/// Test utilities including a mock completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIClient, ExtractionError, MockBackend, OpenAICompatibleBackend, RawTransaction,
    StatementExtractor,
};
pub use error::{Error, Result};
pub use models::{Category, Transaction, TransactionType};
pub use pipeline::{ExtractionSource, ProcessedStatement, StatementProcessor};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use rules::{KeywordRules, RulesSource};
pub use statement::StatementParser;
