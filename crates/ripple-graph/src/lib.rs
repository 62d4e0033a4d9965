//! Client for the external share and post-id resolver endpoints.
//!
//! The scheduler only talks to the outside world through [`SharePoster`]:
//! - **resolve**: turn a submitted post URL into an opaque [`PostId`]
//! - **share**: publish one share of a post on behalf of an access token
//!
//! [`GraphClient`] is the reqwest-backed implementation used in production.

mod client;
mod error;
mod poster;
mod types;

pub use client::{DEFAULT_GRAPH_URL, DEFAULT_RESOLVER_URL, GraphClient};
pub use error::GraphError;
pub use poster::SharePoster;
pub use types::PostId;
