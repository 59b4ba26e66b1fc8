//! Request handlers for the issue tracking API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::issues::{Issue, IssueRepository, RepositoryError};
use crate::ratelimit::{enforce, RateLimitGate};

/// Shared state for the request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The issue repository
    pub issues: Arc<IssueRepository>,
}

impl AppState {
    /// Create new handler state over the given repository.
    pub fn new(issues: Arc<IssueRepository>) -> Self {
        Self { issues }
    }
}

/// Build the service router with the rate limit gate in front of every route.
pub fn router(state: AppState, gate: RateLimitGate) -> Router {
    Router::new()
        .route("/api/issues", get(list_issues).post(create_issue))
        .route(
            "/api/issues/{id}",
            get(get_issue).put(update_issue).delete(delete_issue),
        )
        .route("/health", get(health))
        .route_layer(middleware::from_fn_with_state(gate, enforce))
        .with_state(state)
}

/// Liveness probe.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn list_issues(State(state): State<AppState>) -> Json<Vec<Issue>> {
    Json(state.issues.list())
}

async fn get_issue(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    match state.issues.get(id) {
        Some(issue) => Json(issue).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn create_issue(State(state): State<AppState>, Json(issue): Json<Issue>) -> Response {
    if let Err(reason) = issue.validate() {
        warn!(id = issue.id, reason = %reason, "Rejected invalid issue");
        return StatusCode::BAD_REQUEST.into_response();
    }

    match state.issues.insert(issue.clone()) {
        Ok(()) => {
            debug!(id = issue.id, "Issue created");
            (StatusCode::CREATED, Json(issue)).into_response()
        }
        Err(RepositoryError::Duplicate(id)) => {
            warn!(id = id, "Rejected duplicate issue");
            StatusCode::BAD_REQUEST.into_response()
        }
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn update_issue(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(issue): Json<Issue>,
) -> StatusCode {
    if id != issue.id {
        warn!(path_id = id, body_id = issue.id, "Issue id mismatch");
        return StatusCode::BAD_REQUEST;
    }
    if issue.validate().is_err() {
        return StatusCode::BAD_REQUEST;
    }

    match state.issues.update(issue) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::BAD_REQUEST,
    }
}

async fn delete_issue(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    match state.issues.remove(id) {
        Some(_) => {
            debug!(id = id, "Issue deleted");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::{IssueType, Priority};
    use crate::ratelimit::{InMemoryStatisticsStore, PolicyRegistry, RateLimiter};
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Router with an empty policy registry, so no request is gated.
    fn app() -> Router {
        let state = AppState::new(Arc::new(IssueRepository::new()));
        let gate = RateLimitGate::new(
            Arc::new(PolicyRegistry::new()),
            Arc::new(RateLimiter::new(Arc::new(InMemoryStatisticsStore::new()))),
        );
        router(state, gate)
    }

    fn issue_json(id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": "Broken login",
            "description": "500 on submit",
            "priority": "high",
            "issue_type": "bug",
            "created": "2026-08-06T12:00:00Z",
        })
    }

    fn post(path: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn put(path: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::PUT)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn req(method: Method, path: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_returns_issue() {
        let app = app();

        let created = app
            .clone()
            .oneshot(post("/api/issues", &issue_json(1)))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let response = app.oneshot(req(Method::GET, "/api/issues/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let issue: Issue = serde_json::from_slice(&body).unwrap();
        assert_eq!(issue.id, 1);
        assert_eq!(issue.priority, Priority::High);
        assert_eq!(issue.issue_type, IssueType::Bug);
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_not_found() {
        let response = app()
            .oneshot(req(Method::GET, "/api/issues/999"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_returns_created_issues() {
        let app = app();

        for id in 1..=3 {
            app.clone()
                .oneshot(post("/api/issues", &issue_json(id)))
                .await
                .unwrap();
        }

        let response = app.oneshot(req(Method::GET, "/api/issues")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let issues: Vec<Issue> = serde_json::from_slice(&body).unwrap();
        let ids: Vec<u64> = issues.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_create_duplicate_returns_bad_request() {
        let app = app();

        app.clone()
            .oneshot(post("/api/issues", &issue_json(1)))
            .await
            .unwrap();
        let response = app
            .oneshot(post("/api/issues", &issue_json(1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_without_title_returns_bad_request() {
        let mut body = issue_json(1);
        body["title"] = serde_json::json!("");

        let response = app().oneshot(post("/api/issues", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_existing_returns_no_content() {
        let app = app();

        app.clone()
            .oneshot(post("/api/issues", &issue_json(1)))
            .await
            .unwrap();

        let mut body = issue_json(1);
        body["title"] = serde_json::json!("Broken logout");
        let response = app
            .clone()
            .oneshot(put("/api/issues/1", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(req(Method::GET, "/api/issues/1")).await.unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let issue: Issue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(issue.title, "Broken logout");
    }

    #[tokio::test]
    async fn test_update_mismatched_id_returns_bad_request() {
        let app = app();

        app.clone()
            .oneshot(post("/api/issues", &issue_json(1)))
            .await
            .unwrap();
        let response = app
            .oneshot(put("/api/issues/2", &issue_json(1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_nonexistent_returns_bad_request() {
        let response = app()
            .oneshot(put("/api/issues/3", &issue_json(3)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_existing_returns_no_content() {
        let app = app();

        app.clone()
            .oneshot(post("/api/issues", &issue_json(1)))
            .await
            .unwrap();
        let response = app
            .clone()
            .oneshot(req(Method::DELETE, "/api/issues/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(req(Method::GET, "/api/issues/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_returns_not_found() {
        let response = app()
            .oneshot(req(Method::DELETE, "/api/issues/999"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
