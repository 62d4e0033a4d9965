//! Error types for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ripple_scheduler::SchedulerError;
use serde_json::json;
use thiserror::Error;

/// Errors returned by the API handlers.
///
/// Every variant is reported as `500 {"error": message}`.
#[derive(Debug, Error)]
pub enum WebError {
    /// The scheduler refused or could not start the job.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// The request body could not be read.
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
