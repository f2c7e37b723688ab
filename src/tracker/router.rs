use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::config::AuthConfig;

use super::domain::{artifact_file_name, CandidateDraft, CandidateId};
use super::service::CandidateService;
use super::store::CandidateStore;

/// Shared state for the tracker endpoints.
pub struct TrackerState<S> {
    pub service: Arc<CandidateService<S>>,
    pub auth: Arc<AuthConfig>,
}

impl<S> Clone for TrackerState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            auth: self.auth.clone(),
        }
    }
}

/// Router builder exposing the login, mutation, and download endpoints.
pub fn tracker_router<S>(state: TrackerState<S>) -> Router
where
    S: CandidateStore + 'static,
{
    Router::new()
        .route("/login", post(login_handler::<S>))
        .route("/save", post(save_handler::<S>))
        .route("/delete", post(delete_handler::<S>))
        .route("/download", get(download_handler::<S>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct DeleteRequest {
    #[serde(default)]
    ids: Vec<CandidateId>,
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    domain: Option<String>,
}

async fn login_handler<S>(
    State(state): State<TrackerState<S>>,
    Json(credentials): Json<LoginRequest>,
) -> Response
where
    S: CandidateStore + 'static,
{
    if state.auth.matches(&credentials.username, &credentials.password) {
        let payload = json!({ "status": "ok", "message": "Login successful" });
        (StatusCode::OK, Json(payload)).into_response()
    } else {
        let payload = json!({ "status": "error", "message": "Invalid credentials" });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    }
}

async fn save_handler<S>(
    State(state): State<TrackerState<S>>,
    Json(draft): Json<CandidateDraft>,
) -> Response
where
    S: CandidateStore + 'static,
{
    match state.service.submit(draft) {
        Ok(id) => {
            let payload = json!({ "status": "ok", "id": id });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

async fn delete_handler<S>(
    State(state): State<TrackerState<S>>,
    Json(request): Json<DeleteRequest>,
) -> Response
where
    S: CandidateStore + 'static,
{
    match state.service.remove(&request.ids) {
        Ok(count) => {
            let payload = json!({ "status": "deleted", "count": count });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

async fn download_handler<S>(
    State(state): State<TrackerState<S>>,
    Query(query): Query<DownloadQuery>,
) -> Response
where
    S: CandidateStore + 'static,
{
    let domain = query.domain.as_deref().unwrap_or_default();
    let Some(path) = state.service.artifact_path(domain) else {
        let payload = json!({ "error": "Invalid domain" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let file_name = artifact_file_name(domain);
            let headers = [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{file_name}\""),
                ),
            ];
            (StatusCode::OK, headers, bytes).into_response()
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let payload = json!({ "error": "File not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
