//! AI extraction types
//!
//! These types are backend-agnostic and used across all AI implementations.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One element of the model's JSON array, before validation
///
/// Every field is optional and loosely typed: models return numbers as
/// strings, omit fields, or invent extra ones. `validate::finalize` decides
/// what survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    /// Number or numeric string
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_method: Option<String>,
}

/// Keep string values; any other JSON type reads as missing
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Why the AI stage did not produce records
///
/// Every variant makes the orchestrator fall back to the heuristic parser.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("AI request timed out after {0:?}")]
    Timeout(Duration),

    #[error("OpenAI API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid JSON from AI: {0}")]
    MalformedJson(String),

    #[error("AI response does not match the transaction schema: {0}")]
    SchemaMismatch(String),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl ExtractionError {
    /// Short machine-friendly name, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Status { .. } => "status",
            Self::MalformedJson(_) => "malformed_json",
            Self::SchemaMismatch(_) => "schema_mismatch",
            Self::Prompt(_) => "prompt",
        }
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<crate::error::Error> for ExtractionError {
    fn from(e: crate::error::Error) -> Self {
        Self::Prompt(e.to_string())
    }
}
