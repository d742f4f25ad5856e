use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::middleware::request_id::RequestId;

use super::AppState;

/// `Cache-Control` sent with a successful feed response
pub const FEED_CACHE_CONTROL: &str = "public, max-age=300";

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Answers every method but GET with a JSON 405
///
/// Layered outside CORS so OPTIONS and HEAD are rejected too, never treated
/// as preflights.
pub async fn require_get(request: Request, next: Next) -> Response {
    if request.method() != Method::GET {
        tracing::debug!(method = %request.method(), "Rejected non-GET feed request");
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({ "error": "Method not allowed" })),
        )
            .into_response();
    }
    next.run(request).await
}

/// Recently watched feed: Trakt history enriched with TMDB posters
///
/// Upstream Trakt failures are forwarded with their own status code; any
/// other failure becomes a 500.
pub async fn recently_watched(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Response {
    tracing::info!(
        request_id = %request_id,
        username = %state.feed.username(),
        limit = state.feed.limit(),
        "Fetching recently watched"
    );

    match state.feed.load().await {
        Ok(items) => {
            tracing::info!(
                request_id = %request_id,
                items = items.len(),
                "Recently watched served"
            );
            (
                StatusCode::OK,
                [(header::CACHE_CONTROL, FEED_CACHE_CONTROL)],
                Json(items),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Error in Trakt function");
            e.into_response()
        }
    }
}
