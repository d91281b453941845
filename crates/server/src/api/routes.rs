use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use super::middleware::metrics_middleware;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // The addon protocol requires wide-open CORS; OPTIONS preflights are
    // answered by the layer itself.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/", get(handlers::root))
        .route("/metrics", get(handlers::metrics))
        // Configuration page, with and without a token prefix
        .route("/configure", get(handlers::configure))
        .route("/{config}/configure", get(handlers::configure_with_token))
        // Manifest, with and without a token prefix
        .route("/manifest.json", get(handlers::manifest))
        .route("/{config}/manifest.json", get(handlers::manifest))
        // Stream lookups; the extra segment carries `&`-joined parameters
        .route("/stream/{title_type}/{id}", get(handlers::stream))
        .route(
            "/stream/{title_type}/{id}/{extra}",
            get(handlers::stream_with_extra),
        )
        .route(
            "/{config}/stream/{title_type}/{id}",
            get(handlers::stream_with_token),
        )
        .route(
            "/{config}/stream/{title_type}/{id}/{extra}",
            get(handlers::stream_with_token_and_extra),
        )
        // Deferred direct-link resolution
        .route(
            "/resolve/{provider}/{api_key}/{id}/{*host_url}",
            get(handlers::resolve),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(cors)
        .with_state(state)
}
