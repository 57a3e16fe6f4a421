//! Test utilities for ledger-core
//!
//! Provides a mock OpenAI-compatible completion server that binds to a
//! random local port, so the real HTTP backend can be exercised end to end
//! without network access.
//!
//! This file only depends on external crates so integration tests can
//! include it directly.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// How the mock server answers `POST /v1/chat/completions`
#[derive(Debug, Clone)]
pub enum CompletionBehavior {
    /// 200 with this string as the first choice's message content
    Content(String),
    /// This status code with this body
    Status(u16, String),
    /// 200 with an empty `choices` array
    NoChoices,
    /// 200 with `"content": null` in the first choice
    NullContent,
    /// Sleep, then answer with this content
    Delayed(Duration, String),
}

struct ServerState {
    behavior: CompletionBehavior,
    requests: AtomicUsize,
    last_request: Mutex<Option<Value>>,
    last_auth: Mutex<Option<String>>,
}

/// Mock chat-completions server for testing
pub struct MockCompletionServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCompletionServer {
    /// Start the mock server on an available port
    pub async fn start(behavior: CompletionBehavior) -> Self {
        let state = Arc::new(ServerState {
            behavior,
            requests: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            last_auth: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_completion))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Answer with a completion whose content is `content`
    pub async fn with_content(content: impl Into<String>) -> Self {
        Self::start(CompletionBehavior::Content(content.into())).await
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of completion requests received so far
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// JSON body of the most recent completion request
    pub fn last_request(&self) -> Option<Value> {
        self.state.last_request.lock().unwrap().clone()
    }

    /// Authorization header of the most recent completion request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_auth.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCompletionServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Model list endpoint (health check)
async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "gpt-4o-mini", "object": "model"}]
    }))
}

/// Chat completions endpoint
async fn handle_completion(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    *state.last_request.lock().unwrap() = Some(request.clone());
    *state.last_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let model = request["model"].as_str().unwrap_or("mock").to_string();

    match &state.behavior {
        CompletionBehavior::Content(content) => completion(&model, content).into_response(),
        CompletionBehavior::Status(code, body) => (
            StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body.clone(),
        )
            .into_response(),
        CompletionBehavior::NoChoices => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": []
        }))
        .into_response(),
        CompletionBehavior::NullContent => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": null},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        CompletionBehavior::Delayed(delay, content) => {
            tokio::time::sleep(*delay).await;
            completion(&model, content).into_response()
        }
    }
}

fn completion(model: &str, content: &str) -> Json<Value> {
    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}
