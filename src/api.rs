//! HTTP API.
//!
//! Endpoints:
//!   GET  /              → registration page (HTML)
//!   GET  /ranking       → players by rating, highest first (JSON)
//!   POST /api/submit    → multipart registration: name, club, category, file

use std::future::Future;
use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::model::{PhotoUpload, SubmissionForm, DEFAULT_CONTENT_TYPE};
use crate::page;
use crate::ranking;
use crate::store::Backend;
use crate::submission;

/// Shared state passed to all handlers.
pub struct AppState {
    pub backend: Backend,
    /// Rendered registration page.
    pub page: String,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config, backend: Backend) -> Self {
        Self {
            backend,
            page: page::render(&config.page.title),
            max_body_bytes: config.max_body_bytes(),
        }
    }
}

// ──────────────── response types ──────────────────────────────────────────

#[derive(Serialize)]
struct SubmitResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
}

impl SubmitResponse {
    fn ok() -> Self {
        Self { status: "ok", msg: None }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self { status: "error", msg: Some(msg.into()) }
    }
}

// ──────────────── router ──────────────────────────────────────────────────

/// Build the axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let limit = state.max_body_bytes;
    Router::new()
        .route("/", get(handle_page))
        .route("/ranking", get(handle_ranking))
        .route("/api/submit", post(handle_submit))
        .layer(DefaultBodyLimit::max(limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until `shutdown` resolves.
pub async fn start_server<F>(state: Arc<AppState>, port: u16, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(port, "HTTP server listening on http://{}", addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}

// ──────────────── handlers ────────────────────────────────────────────────

async fn handle_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn handle_ranking(State(state): State<Arc<AppState>>) -> Response {
    let stores = match state.backend.stores() {
        Ok(s) => s,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "Error config").into_response(),
    };

    match ranking::fetch_ranking(stores).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => {
            error!(error = %e, "Ranking read failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error ranking").into_response()
        }
    }
}

async fn handle_submit(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let stores = match state.backend.stores() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Submission rejected, store not configured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitResponse::error("Server misconfigured")),
            )
                .into_response();
        }
    };

    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            warn!(error = %rejection, "Submission is not a multipart form");
            return (rejection.status(), Json(SubmitResponse::error(rejection.body_text())))
                .into_response();
        }
    };

    let form = match read_form(multipart).await {
        Ok(f) => f,
        Err(e) => {
            warn!(error = %e, "Malformed submission form");
            return (e.status(), Json(SubmitResponse::error(e.body_text()))).into_response();
        }
    };

    let timestamp = chrono::Utc::now().timestamp();
    match submission::register(stores, &form, timestamp).await {
        Ok(_) => (StatusCode::OK, Json(SubmitResponse::ok())).into_response(),
        Err(e) => {
            warn!(error = %e, "Inscription insert failed");
            (StatusCode::BAD_REQUEST, Json(SubmitResponse::error(e.to_string()))).into_response()
        }
    }
}

/// Decode the multipart body. The first value of a repeated field wins; a
/// `file` part with an empty file name means no photo.
async fn read_form(mut multipart: Multipart) -> Result<SubmissionForm, MultipartError> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await?;
                if form.photo.is_none() && !file_name.is_empty() {
                    form.photo = Some(PhotoUpload { file_name, content_type, bytes });
                }
            }
            "name" | "club" | "category" => {
                let value = field.text().await?;
                let slot = match name.as_str() {
                    "name" => &mut form.name,
                    "club" => &mut form.club,
                    _ => &mut form.category,
                };
                if slot.is_none() {
                    *slot = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}
