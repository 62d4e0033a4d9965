//! HTTP API for Ripple.
//!
//! Exposes the scheduler over HTTP:
//! - `POST /api/submit` to start a share job
//! - `GET /total` for progress of active jobs
//! - `GET /share-history` for every accepted submission
//! - `GET /` for the bundled submit page

mod error;
mod routes;

pub use error::WebError;
pub use routes::{AppState, TotalEntry, create_router};
