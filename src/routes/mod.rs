//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/` - Service banner
//! - `/health`, `/health/detailed` - Health checks (rate-limit exempt)
//! - `/api/v1` - Versioned API surface
//!
//! Middleware is layered to match the request path:
//! logging (outermost) -> rate limiting -> security headers -> CORS.
//! A rate-limited 429 therefore shows up in the logs but never reaches
//! the inner layers or a handler.

pub mod api_v1;
pub mod health;

use axum::{
    extract::Extension,
    http::{HeaderValue, StatusCode, Uri},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ErrorBody;
use crate::middleware::{
    rate_limit_middleware, request_logging_middleware, security_headers_middleware, RequestId,
};
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(health::router(state.clone()))
        .merge(api_v1::router(state.clone()))
        .fallback(not_found)
        .layer(cors_layer(&state.config.server))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn_with_state(
            state,
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(request_logging_middleware))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn not_found(request_id: Option<Extension<RequestId>>, uri: Uri) -> Response {
    let body = ErrorBody::new("NOT_FOUND", format!("No route for {}", uri.path()))
        .with_request_id(request_id.map(|Extension(RequestId(id))| id));
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
