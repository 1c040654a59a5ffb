use axum::{
    extract::{multipart::Multipart, DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use dropcheck_core::{SessionError, SessionStatus};
use dropcheck_media::{preview_router, ImageFile, IntakeSource, MediaError, PreviewRegistry};

use crate::shell::AppShell;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared application state for API handlers.
#[derive(Clone)]
pub struct AppState {
    pub shell: AppShell,
    pub registry: PreviewRegistry,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let previews = preview_router(state.registry.clone());

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/session", get(get_session))
        .route("/api/images", post(upload_images).delete(clear_images))
        .route("/api/verify", post(verify))
        .with_state(state)
        .nest("/api/previews", previews)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "dropcheck",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn get_session(State(state): State<AppState>) -> Response {
    Json(state.shell.snapshot().await).into_response()
}

#[derive(Debug, Deserialize)]
struct UploadQuery {
    #[serde(default)]
    source: IntakeSource,
}

/// Replace the selection with the uploaded batch.
async fn upload_images(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Response {
    let mut files = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.body_text()),
        };
        let name = field
            .file_name()
            .or_else(|| field.name())
            .unwrap_or("upload")
            .to_string();
        let declared = field.content_type().map(str::to_string);
        match field.bytes().await {
            Ok(bytes) => files.push(ImageFile::from_bytes(name, declared.as_deref(), bytes)),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.body_text()),
        }
    }

    let offered = files.len();
    match state.shell.select(files, query.source).await {
        Ok(outcome) => {
            info!(offered, accepted = outcome.accepted, selected = outcome.selected, "Upload handled");
            Json(json!({
                "outcome": outcome,
                "session": state.shell.snapshot().await,
            }))
            .into_response()
        }
        Err(e) => media_error_response(&e),
    }
}

async fn clear_images(State(state): State<AppState>) -> Response {
    state.shell.clear().await;
    Json(state.shell.snapshot().await).into_response()
}

/// Run one verification. 200 on a parsed result, 422 when the attempt ended
/// in failure, 409 while another attempt is running or the selection moved on.
async fn verify(State(state): State<AppState>) -> Response {
    let status = match state.shell.verify().await {
        Ok(status) => status,
        Err(SessionError::AlreadyBusy) => {
            return error_response(StatusCode::CONFLICT, "A verification is already in progress.")
        }
        Err(e) => {
            warn!(error = %e, "Verification could not be recorded");
            return error_response(StatusCode::CONFLICT, &e.to_string());
        }
    };

    let code = match status {
        SessionStatus::Succeeded => StatusCode::OK,
        SessionStatus::Failed => StatusCode::UNPROCESSABLE_ENTITY,
        SessionStatus::Idle | SessionStatus::Busy => StatusCode::CONFLICT,
    };
    (code, Json(state.shell.snapshot().await)).into_response()
}

fn media_error_response(e: &MediaError) -> Response {
    let code = match e {
        MediaError::PreviewTableFull { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_REQUEST,
    };
    warn!(error = %e, "Rejected upload");
    error_response(code, &e.to_string())
}

fn error_response(code: StatusCode, message: &str) -> Response {
    (code, Json(json!({ "error": message }))).into_response()
}
