//! Statement upload handler

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use ledger_core::Transaction;

/// Message returned for any failure after the upload was read
pub const PROCESSING_FAILED: &str = "Failed to process bank statement";

/// Response for a processed statement
#[derive(Debug, Serialize)]
pub struct ProcessStatementResponse {
    pub success: bool,
    pub transactions: Vec<Transaction>,
    pub message: String,
}

/// POST /api/process-statement - Extract transactions from a statement
///
/// Expects multipart form with:
/// - file: statement text (required, max 10MB, decoded as UTF-8 with replacement)
pub async fn process_statement(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ProcessStatementResponse>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        file_data = Some(bytes.to_vec());
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("No file provided"))?;

    process_statement_core(&state, file_data).await
}

/// Core processing logic - separated for testability
///
/// The pipeline itself never fails; the work runs on its own task so that an
/// unexpected panic becomes a 500 instead of a dropped connection. If the
/// client goes away, the task and its completion call are aborted.
pub async fn process_statement_core(
    state: &AppState,
    file_data: Vec<u8>,
) -> Result<Json<ProcessStatementResponse>, AppError> {
    let text = String::from_utf8_lossy(&file_data).into_owned();
    debug!(bytes = file_data.len(), "Processing uploaded statement");

    let processor = state.processor.clone();
    let result = run_abortable(async move { processor.process_detailed(&text).await })
        .await
        .map_err(|e| AppError::internal(PROCESSING_FAILED).with_source(e))?;

    let count = result.transactions.len();
    info!(
        count,
        source = result.source.as_str(),
        "Processed bank statement"
    );

    Ok(Json(ProcessStatementResponse {
        success: true,
        transactions: result.transactions,
        message: format!("Successfully processed {} transactions", count),
    }))
}

/// Aborts the task when dropped
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run a future on its own task, tied to the caller's lifetime
///
/// A panic in the future comes back as a `JoinError`. Dropping the returned
/// future aborts the task.
pub async fn run_abortable<F>(future: F) -> Result<F::Output, JoinError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let mut task = AbortOnDrop(tokio::spawn(future));
    (&mut task.0).await
}
