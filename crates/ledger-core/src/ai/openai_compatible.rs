//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! api.openai.com, Azure-style proxies, vLLM, LocalAI, llama-server, etc.
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_API_KEY` (or `NEXT_PUBLIC_OPENAI_API_KEY`): API key (required)
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4o-mini)

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prompts::{category_list, PromptId, PromptLibrary};

use super::parsing::parse_transactions_response;
use super::types::{ExtractionError, RawTransaction};
use super::StatementExtractor;

/// Default API server
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature for extraction
const TEMPERATURE: f32 = 0.3;

/// Completion budget; long statements produce long arrays
const MAX_TOKENS: u32 = 4000;

/// HTTP client timeout, a backstop behind the orchestrator's own timeout
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI-compatible backend
///
/// Sends the rendered extraction prompt as a `system` message and the
/// statement text as a `user` message to `POST {base}/v1/chat/completions`.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl std::fmt::Debug for OpenAICompatibleBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompatibleBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Stands in for a completion with nothing in it
const EMPTY_COMPLETION: &str = "[]";

fn build_client() -> Client {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..Self::new(base_url, model)
        }
    }

    /// Use a specific prompt library (e.g. embedded-only in tests)
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_API_KEY` or `NEXT_PUBLIC_OPENAI_API_KEY`
    /// Optional: `OPENAI_BASE_URL` (default: https://api.openai.com)
    /// Optional: `OPENAI_MODEL` (default: gpt-4o-mini)
    pub fn from_env() -> Option<Self> {
        let api_key = ["OPENAI_API_KEY", "NEXT_PUBLIC_OPENAI_API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|v| !v.trim().is_empty())?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Some(Self::with_api_key(&base_url, &model, api_key.trim()))
    }

    /// Render the system and user messages for a statement
    fn build_messages(&self, text: &str) -> Result<Vec<ChatMessage>, ExtractionError> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| ExtractionError::Prompt("Failed to acquire prompt library lock".into()))?;
        let template = prompts.get(PromptId::ExtractTransactions)?;
        debug!(
            version = template.metadata.version,
            is_override = template.is_override,
            "Rendering extraction prompt"
        );

        let categories = category_list();
        let mut vars = HashMap::new();
        vars.insert("categories", categories.as_str());
        let system = template.render_system(&vars);

        let mut vars = HashMap::new();
        vars.insert("statement", text);
        let user = template.render_user(&vars)?;

        Ok(vec![
            ChatMessage {
                role: "system".to_string(),
                content: system,
            },
            ChatMessage {
                role: "user".to_string(),
                content: user,
            },
        ])
    }

    /// Make a chat completion request and return the first choice's content
    ///
    /// No choices, null content and blank content all come back as `"[]"`.
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String, ExtractionError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status { status, body });
        }

        let chat_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            ExtractionError::MalformedJson(format!("Invalid completion envelope: {}", e))
        })?;

        Ok(chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .unwrap_or_else(|| EMPTY_COMPLETION.to_string()))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message (content is null for refusals/tool calls)
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl StatementExtractor for OpenAICompatibleBackend {
    async fn extract_transactions(
        &self,
        text: &str,
    ) -> Result<Vec<RawTransaction>, ExtractionError> {
        let messages = self.build_messages(text)?;
        let response = self.chat_completion(messages).await?;
        debug!(
            model = %self.model,
            chars = response.chars().count(),
            "OpenAI-compatible extraction response received"
        );

        parse_transactions_response(&response)
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_new() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8080", "gpt-4o-mini");
        assert_eq!(backend.model(), "gpt-4o-mini");
        assert_eq!(backend.host(), "http://localhost:8080");
        assert!(backend.api_key.is_none());
    }

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8080/", "gpt-4o-mini");
        assert_eq!(backend.host(), "http://localhost:8080");
    }

    #[test]
    fn test_backend_with_api_key() {
        let backend =
            OpenAICompatibleBackend::with_api_key("https://api.openai.com", "gpt-4o", "sk-test123");
        assert_eq!(backend.model(), "gpt-4o");
        assert_eq!(backend.api_key, Some("sk-test123".to_string()));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let backend =
            OpenAICompatibleBackend::with_api_key("https://api.openai.com", "gpt-4o", "sk-secret");
        let debug = format!("{:?}", backend);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OpenAICompatibleBackend::new("http://localhost:99999", "gpt-4o-mini");
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let backend = OpenAICompatibleBackend::new("http://localhost:99999", "gpt-4o-mini")
            .with_prompts(PromptLibrary::embedded_only());
        let err = backend.extract_transactions("text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Transport(_)));
    }

    #[test]
    fn test_build_messages() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8080", "gpt-4o-mini")
            .with_prompts(PromptLibrary::embedded_only());
        let messages = backend.build_messages("12/01/2024 Zomato Rs.450.00").unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("Bills & Utilities"));
        assert!(messages[0].content.contains("bank transfer"));
        assert_eq!(messages[1].role, "user");
        assert_eq!(
            messages[1].content,
            "Extract and categorize all transactions from this bank statement:\n\n12/01/2024 Zomato Rs.450.00"
        );
    }

    #[test]
    fn test_chat_completion_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hello");
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.3).abs() < 0.001);
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_chat_completion_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "[]"
                },
                "finish_reason": "stop"
            }]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.content.as_deref(), Some("[]"));
    }

    #[test]
    fn test_chat_completion_response_null_content() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices[0].message.content.is_none());

        let response: ChatCompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(response.choices.is_empty());
    }
}
