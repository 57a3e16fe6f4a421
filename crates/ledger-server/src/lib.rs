//! Ledger Web Server
//!
//! Axum-based REST API in front of the statement processing pipeline.
//!
//! Security features:
//! - Restrictive CORS policy (explicit origins via `LEDGER_ALLOWED_ORIGINS`)
//! - Upload size limit
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use ledger_core::{StatementExtractor, StatementProcessor};

mod handlers;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Headroom for multipart boundaries and part headers on top of the file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Server configuration
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `LEDGER_ALLOWED_ORIGINS` (comma-separated)
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var("LEDGER_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { allowed_origins }
    }
}

/// Shared application state
pub struct AppState {
    pub processor: StatementProcessor,
    pub config: ServerConfig,
}

/// Create the application router
pub fn create_router(
    processor: StatementProcessor,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    match processor.ai() {
        Some(ai) => info!(host = ai.host(), model = ai.model(), "AI extraction enabled"),
        None => info!("ℹ️  AI backend not configured (set OPENAI_API_KEY to enable AI extraction)"),
    }

    let cors = build_cors(&config);
    let state = Arc::new(AppState { processor, config });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/process-statement",
            post(handlers::process_statement)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + MULTIPART_OVERHEAD)),
        );

    // CSP: same-origin only, inline styles allowed for the static frontend
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn build_cors(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        cors
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server
pub async fn serve(
    processor: StatementProcessor,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    check_ai_connection(&processor).await;

    let app = create_router(processor, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(processor: &StatementProcessor) {
    match processor.ai() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ AI backend reachable: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} (statements will use the offline parser until it recovers)",
                    client.host()
                );
            }
        }
        None => {
            info!("ℹ️  AI backend not configured, using the offline statement parser");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Attach the underlying error for logging; the client only sees `message`
    pub fn with_source(mut self, err: impl Into<anyhow::Error>) -> Self {
        self.internal = Some(err.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}
