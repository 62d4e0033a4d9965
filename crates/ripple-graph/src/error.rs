//! Error types for the graph client.

use thiserror::Error;

/// Errors that can occur when talking to the resolver or the share endpoint.
#[derive(Debug, Error)]
pub enum GraphError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with an unexpected status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}
