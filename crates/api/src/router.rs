//! The application [`Router`]: routes, uploaded files, and the layers around
//! them. `main.rs` and the integration tests both build the app through
//! [`build_app_router`].

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeader;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request id, generated when the client sends none.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Stored images are named by a fresh UUID on upload, so a URL
/// never changes meaning.
const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Assemble the catalog app.
///
/// Uploaded images under `config.storage_public_url` come straight from
/// `config.storage_dir`. Outermost layer first, a request passes through
/// CORS, request id assignment, tracing, request id echo, the timeout, and
/// panic recovery.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let images = SetResponseHeader::overriding(
        ServeDir::new(&config.storage_dir),
        CACHE_CONTROL,
        HeaderValue::from_static(IMAGE_CACHE_CONTROL),
    );

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes(config))
        .nest_service(&config.storage_public_url, images)
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
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(cors_layer(config, request_id))
        .with_state(state)
}

/// Browser access for the configured front-end origins.
///
/// Operators authenticate with a bearer header rather than cookies, so
/// credentialed requests are not enabled.
fn cors_layer(config: &ServerConfig, request_id: HeaderName) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(config.cors_origins.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([request_id])
        .max_age(Duration::from_secs(3600))
}
