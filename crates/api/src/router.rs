//! Router assembly shared by `main.rs` and the integration tests.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::routes;
use crate::state::AppState;

const REQUEST_ID: &str = "x-request-id";

/// `/health` at the root and the BOS API under `/api/v1`.
///
/// Layers, outermost first: CORS, request id, tracing, request id
/// propagation, timeout, panic recovery, body limit.
pub fn build_app_router(state: AppState) -> Router {
    let config = &state.config;
    let request_id = HeaderName::from_static(REQUEST_ID);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(&config.cors_origins))
        .with_state(state)
}

/// CORS for the configured origins, which `ServerConfig` guarantees are
/// explicit (no wildcard). Browsers may send and read the
/// request id so client logs can be correlated with server spans.
pub fn build_cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID);

    CorsLayer::new()
        .allow_origin(origins.to_vec())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
