//! reqwest implementation of [`SharePoster`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::types::ResolveResponse;
use crate::{GraphError, PostId, SharePoster};

/// Default post-id resolver endpoint.
pub const DEFAULT_RESOLVER_URL: &str = "https://id.traodoisub.com/api.php";

/// Default Graph API base URL.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";

/// Base of the link that gets shared for a post id.
const SHARE_LINK_BASE: &str = "https://m.facebook.com";

/// Client for the resolver and the Graph API feed endpoint.
pub struct GraphClient {
    http: Client,
    resolver_url: String,
    graph_url: String,
}

impl GraphClient {
    /// Create a client pointing at the default endpoints.
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_RESOLVER_URL, DEFAULT_GRAPH_URL)
    }

    /// Create a client with explicit resolver and Graph API endpoints.
    pub fn with_endpoints(resolver_url: impl Into<String>, graph_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            resolver_url: resolver_url.into(),
            graph_url: graph_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the resolver endpoint.
    pub fn resolver_url(&self) -> &str {
        &self.resolver_url
    }

    /// Get the Graph API base URL.
    pub fn graph_url(&self) -> &str {
        &self.graph_url
    }
}

impl Default for GraphClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SharePoster for GraphClient {
    async fn resolve_post_id(&self, url: &str) -> Result<Option<PostId>, GraphError> {
        let response = self
            .http
            .post(&self.resolver_url)
            .form(&[("link", url)])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GraphError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        // The resolver answers with plain text for links it cannot parse.
        let parsed: ResolveResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "resolver returned a non-JSON body");
                ResolveResponse::default()
            }
        };

        let post_id = parsed.post_id();
        debug!(url, post_id = ?post_id, "resolved post id");
        Ok(post_id)
    }

    async fn share(&self, post_id: &PostId, access_token: &str) -> Result<(), GraphError> {
        let url = format!("{}/me/feed", self.graph_url);
        let link = format!("{}/{}", SHARE_LINK_BASE, post_id);

        let response = self
            .http
            .post(&url)
            .query(&[
                ("link", link.as_str()),
                ("published", "0"),
                ("access_token", access_token),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(post_id = %post_id, status = status.as_u16(), "share rejected");
            return Err(GraphError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
