//! Error types for the scheduler.

use ripple_graph::GraphError;
use thiserror::Error;

/// Message returned when any of the four submission fields is missing.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing access token, url, amount, or interval";

/// Errors that can occur in scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The submission is missing a field or carries an unusable value.
    #[error("{0}")]
    Validation(String),

    /// The resolver answered but gave no post id.
    #[error("Unable to get link id: invalid URL, it's either a private post or visible to friends only")]
    InvalidLink,

    /// The resolver could not be reached or rejected the request.
    #[error("Failed to get post ID: {0}")]
    Resolve(#[from] GraphError),

    /// A single share attempt failed; terminal for its job.
    #[error("Error sharing post: {0}")]
    ShareAttempt(#[source] GraphError),
}

impl SchedulerError {
    pub(crate) fn missing_fields() -> Self {
        Self::Validation(MISSING_FIELDS_MESSAGE.to_string())
    }
}
