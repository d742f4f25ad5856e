use axum::{
    http::Method,
    middleware,
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Path of the recently-watched endpoint, kept at its serverless-function location
pub const FEED_PATH: &str = "/.netlify/functions/trakt";

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(handlers::health_check).layer(cors.clone()))
        // The method gate wraps CORS: OPTIONS gets a 405 like any other non-GET
        .route(
            FEED_PATH,
            any(handlers::recently_watched)
                .layer(cors)
                .layer(middleware::from_fn(handlers::require_get)),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}
