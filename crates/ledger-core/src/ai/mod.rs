//! Pluggable AI extraction backend abstraction
//!
//! This module provides a backend-agnostic interface for turning statement
//! text into raw transaction records with a chat-completions model.
//!
//! # Architecture
//!
//! - `StatementExtractor` trait: defines the interface for all backends
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! Backends return unvalidated [`RawTransaction`]s or an [`ExtractionError`]
//! naming why they could not. Validation and the fallback decision belong to
//! the orchestrator in [`crate::pipeline`].
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai, mock). Default: openai
//! - `OPENAI_API_KEY` / `NEXT_PUBLIC_OPENAI_API_KEY`: API key (required for openai)
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4o-mini)

mod mock;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use mock::{MockBackend, MockResponse};
pub use openai_compatible::{OpenAICompatibleBackend, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use types::*;

use async_trait::async_trait;

/// Trait defining the interface for all AI extraction backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait StatementExtractor: Send + Sync {
    /// Extract every transaction in the statement text
    async fn extract_transactions(
        &self,
        text: &str,
    ) -> Result<Vec<RawTransaction>, ExtractionError>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Debug, Clone)]
pub enum AIClient {
    /// OpenAI-compatible backend (api.openai.com, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `openai` (default): needs `OPENAI_API_KEY` or `NEXT_PUBLIC_OPENAI_API_KEY`
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if no credential is configured, in which case statements
    /// go straight to the heuristic parser.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai".to_string());

        match backend.to_lowercase().as_str() {
            "openai" | "openai_compatible" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "mock" => Some(AIClient::mock()),
            "none" | "off" => None,
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai");
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement StatementExtractor for AIClient by delegating to the inner backend
#[async_trait]
impl StatementExtractor for AIClient {
    async fn extract_transactions(
        &self,
        text: &str,
    ) -> Result<Vec<RawTransaction>, ExtractionError> {
        match self {
            AIClient::OpenAICompatible(b) => b.extract_transactions(text).await,
            AIClient::Mock(b) => b.extract_transactions(text).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
