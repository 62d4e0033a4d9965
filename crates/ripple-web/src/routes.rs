//! Web routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use ripple_graph::PostId;
use ripple_scheduler::{HistoryRecord, Scheduler, ShareRequest};
use serde::Serialize;
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::WebError;

const INDEX_HTML: &str = include_str!("index.html");

/// Shared state for the web server.
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
}

/// One row of `GET /total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalEntry {
    /// 1-based position in the registry at response time.
    pub session: usize,
    pub url: String,
    pub count: u32,
    pub id: PostId,
    pub target: u32,
}

/// Create the web router.
///
/// If `static_dir` is provided, its files are served under `/static`.
pub fn create_router(scheduler: Arc<Scheduler>, static_dir: Option<&str>) -> Router {
    let state = Arc::new(AppState { scheduler });

    let mut router = Router::new()
        .route("/", get(index))
        .route("/total", get(total))
        .route("/share-history", get(share_history))
        .route("/api/submit", post(submit))
        .route("/health", get(health))
        .with_state(state);

    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http())
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "active_jobs": state.scheduler.registry().len().await,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn total(State(state): State<Arc<AppState>>) -> Json<Vec<TotalEntry>> {
    let entries = state
        .scheduler
        .registry()
        .snapshot_all()
        .await
        .into_iter()
        .enumerate()
        .map(|(index, job)| TotalEntry {
            session: index + 1,
            url: job.url,
            count: job.count,
            id: job.post_id,
            target: job.target,
        })
        .collect();

    Json(entries)
}

async fn share_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryRecord>> {
    Json(state.scheduler.history().snapshot_all().await)
}

async fn submit(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ShareRequest>, JsonRejection>,
) -> Result<impl IntoResponse, WebError> {
    let Json(request) = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected submit body");
        WebError::BadRequest(rejection.body_text())
    })?;

    let receipt = state.scheduler.submit(request).await.map_err(|e| {
        warn!(error = %e, "submission refused");
        WebError::from(e)
    })?;

    info!(job_id = %receipt.job_id, post_id = %receipt.post_id, "submission accepted");

    Ok(Json(json!({
        "status": 200,
        "accessToken": receipt.access_token
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use ripple_graph::{GraphError, SharePoster};
    use serde_json::Value;
    use tower::ServiceExt;

    struct StubPoster {
        post_id: Option<&'static str>,
    }

    #[async_trait]
    impl SharePoster for StubPoster {
        async fn resolve_post_id(&self, _url: &str) -> Result<Option<PostId>, GraphError> {
            Ok(self.post_id.map(PostId::new))
        }

        async fn share(&self, _post_id: &PostId, _access_token: &str) -> Result<(), GraphError> {
            Ok(())
        }
    }

    fn create_test_router(post_id: Option<&'static str>) -> (Router, Arc<Scheduler>) {
        let scheduler = Arc::new(Scheduler::new(Arc::new(StubPoster { post_id })));
        (create_router(Arc::clone(&scheduler), None), scheduler)
    }

    async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_submit(router: &Router, body: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/submit")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn submission(amount: u32) -> String {
        json!({
            "accessToken": "tok",
            "url": "https://example.com/posts/1",
            "amount": amount,
            "interval": 60
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_index_serves_html() {
        let (router, _) = create_test_router(Some("42"));

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("/api/submit"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (router, _) = create_test_router(Some("42"));

        let (status, json) = get_json(&router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["active_jobs"], 0);
    }

    #[tokio::test]
    async fn test_submit_then_total() {
        let (router, _) = create_test_router(Some("42"));

        let (status, json) = post_submit(&router, &submission(3)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "status": 200, "accessToken": "tok" }));

        let (status, json) = get_json(&router, "/total").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([{
                "session": 1,
                "url": "https://example.com/posts/1",
                "count": 0,
                "id": "42",
                "target": 3
            }])
        );

        let (_, json) = get_json(&router, "/share-history").await;
        assert_eq!(
            json,
            json!([{
                "accessToken": "tok",
                "url": "https://example.com/posts/1",
                "amount": 3,
                "interval": 60
            }])
        );
    }

    #[tokio::test]
    async fn test_sessions_are_positional() {
        let (router, scheduler) = create_test_router(Some("42"));

        let _ = post_submit(&router, &submission(3)).await;
        let _ = post_submit(&router, &submission(4)).await;
        let _ = post_submit(&router, &submission(5)).await;

        let first = scheduler.registry().snapshot_all().await[0].job_id;
        scheduler.registry().remove(first).await;

        let (_, json) = get_json(&router, "/total").await;
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["session"], 1);
        assert_eq!(rows[0]["target"], 4);
        assert_eq!(rows[1]["session"], 2);
        assert_eq!(rows[1]["target"], 5);
    }

    #[tokio::test]
    async fn test_submit_missing_field() {
        let (router, _) = create_test_router(Some("42"));

        let body = json!({ "accessToken": "tok", "url": "u", "amount": 3 }).to_string();
        let (status, json) = post_submit(&router, &body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json,
            json!({ "error": "Missing access token, url, amount, or interval" })
        );

        let (_, total) = get_json(&router, "/total").await;
        let (_, history) = get_json(&router, "/share-history").await;
        assert_eq!(total, json!([]));
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn test_submit_invalid_link() {
        let (router, _) = create_test_router(None);

        let (status, json) = post_submit(&router, &submission(3)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .contains("Unable to get link id")
        );

        let (_, history) = get_json(&router, "/share-history").await;
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn test_submit_malformed_body() {
        let (router, _) = create_test_router(Some("42"));

        let (status, json) = post_submit(&router, "{not json").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].is_string());
    }
}
