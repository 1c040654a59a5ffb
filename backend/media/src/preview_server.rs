//! Serves live previews over HTTP.
//!
//! Mount at `/api/previews`:
//!   GET /api/previews/:id  -> bytes of a live preview, 404 once released

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::warn;
use uuid::Uuid;

use crate::mime_detect::{is_inline_safe, OCTET_STREAM};
use crate::preview::PreviewRegistry;

/// Build the preview router.
pub fn preview_router(registry: PreviewRegistry) -> Router {
    Router::new()
        .route("/:id", get(serve_preview))
        .with_state(registry)
}

async fn serve_preview(Path(id): Path<Uuid>, State(registry): State<PreviewRegistry>) -> Response {
    let Some(file) = registry.resolve(&id) else {
        return (StatusCode::NOT_FOUND, "Preview not found").into_response();
    };

    let bytes = match file.read_all().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(preview = %id, error = %e, "Failed to read preview source");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read preview").into_response();
        }
    };

    let mime = file.media_type();
    let content_type = if is_inline_safe(mime) { mime } else { OCTET_STREAM };
    let content_type =
        HeaderValue::from_str(content_type).unwrap_or(HeaderValue::from_static(OCTET_STREAM));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::ImageFile;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use bytes::Bytes;
    use tower::ServiceExt;

    fn get(id: Uuid) -> Request<Body> {
        Request::builder()
            .uri(format!("/{id}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn serves_live_preview_then_404_after_release() {
        let registry = PreviewRegistry::new(4);
        let file = ImageFile::from_bytes("a.png", Some("image/png"), Bytes::from_static(b"png"));
        let handle = registry.allocate(&file).unwrap();
        let id = handle.id();
        let app = preview_router(registry);

        let resp = app.clone().oneshot(get(id)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"png");

        drop(handle);
        let resp = app.oneshot(get(id)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
