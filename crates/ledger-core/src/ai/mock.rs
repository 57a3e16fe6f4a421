//! Mock backend for testing
//!
//! Returns a configured completion or failure without a running model
//! server. Completion content goes through the same response parser as the
//! real backends.

use std::time::Duration;

use async_trait::async_trait;

use super::parsing::parse_transactions_response;
use super::types::{ExtractionError, RawTransaction};
use super::StatementExtractor;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Raw completion content, parsed like a real model reply
    Content(String),
    /// Fail with this error
    Error(ExtractionError),
}

/// Mock AI backend for testing
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    response: MockResponse,
    delay: Option<Duration>,
    model: String,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, answers with an empty array)
    pub fn new() -> Self {
        Self {
            healthy: true,
            response: MockResponse::Content("[]".to_string()),
            delay: None,
            model: "mock".to_string(),
        }
    }

    /// Answer every request with this completion content
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            response: MockResponse::Content(content.into()),
            ..Self::new()
        }
    }

    /// Fail every request with this error
    pub fn failing(error: ExtractionError) -> Self {
        Self {
            response: MockResponse::Error(error),
            ..Self::new()
        }
    }

    /// Sleep before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl StatementExtractor for MockBackend {
    async fn extract_transactions(
        &self,
        _text: &str,
    ) -> Result<Vec<RawTransaction>, ExtractionError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.response {
            MockResponse::Content(content) => parse_transactions_response(content),
            MockResponse::Error(e) => Err(e.clone()),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
