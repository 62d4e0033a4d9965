//! The capability the scheduler consumes.

use async_trait::async_trait;

use crate::{GraphError, PostId};

/// Performs the two outbound calls a share job needs.
///
/// Implementations must be cheap to share across job tasks.
#[async_trait]
pub trait SharePoster: Send + Sync {
    /// Resolve a post URL to its identifier.
    ///
    /// Returns `Ok(None)` when the resolver answered but had no identifier
    /// (private or friends-only post, or a malformed URL).
    async fn resolve_post_id(&self, url: &str) -> Result<Option<PostId>, GraphError>;

    /// Publish one share of `post_id` using `access_token`.
    async fn share(&self, post_id: &PostId, access_token: &str) -> Result<(), GraphError>;
}
