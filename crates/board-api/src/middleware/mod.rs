//! Middleware stack for the API server
//!
//! Request IDs, request tracing, timeouts, body limits, and CORS.

use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request, StatusCode},
    Router,
};
use board_common::AppConfig;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Room for the text fields of a posting form on top of the file itself
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// HTTP-level settings taken from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub allowed_origins: Vec<String>,
    pub is_production: bool,
    /// Largest accepted request body
    pub body_limit: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            is_production: false,
            body_limit: 4 * 1024 * 1024 + FORM_OVERHEAD_BYTES,
        }
    }
}

impl From<&AppConfig> for HttpSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            allowed_origins: config.cors.allowed_origins.clone(),
            is_production: config.app.env.is_production(),
            body_limit: config.storage.max_file_size_bytes() + FORM_OVERHEAD_BYTES,
        }
    }
}

/// Apply the middleware stack
///
/// Layers wrap outward, so a request passes request ID, tracing, timeout, and CORS in
/// that order before reaching the router.
pub fn apply_middleware(router: Router<AppState>, settings: &HttpSettings) -> Router<AppState> {
    router
        .layer(DefaultBodyLimit::max(settings.body_limit))
        .layer(create_cors_layer(&settings.allowed_origins, settings.is_production))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::SERVICE_UNAVAILABLE,
            REQUEST_TIMEOUT,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(header::HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
}

fn create_cors_layer(allowed_origins: &[String], is_production: bool) -> CorsLayer {
    let base_layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([header::HeaderName::from_static(REQUEST_ID_HEADER)]);

    if !is_production && allowed_origins.is_empty() {
        tracing::warn!(
            "CORS: Allowing any origin (development mode). \
             Configure CORS_ALLOWED_ORIGINS for production."
        );
        return base_layer.allow_origin(Any);
    }

    if allowed_origins.is_empty() {
        tracing::warn!("CORS: No allowed origins configured in production mode");
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    tracing::info!(count = origins.len(), "CORS: Allowing configured origins");
    base_layer.allow_origin(AllowOrigin::list(origins))
}
