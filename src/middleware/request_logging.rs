//! Request logging with per-request ids.
//!
//! Every request gets a UUID that is attached as a request extension (so
//! handlers can echo it in error envelopes) and returned to the client as
//! `X-Request-ID`.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{error, info};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request id handed to downstream handlers via extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

pub async fn request_logging_middleware(mut req: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let start = Instant::now();
    info!(%method, %path, request_id, "request started");

    let mut response = next.run(req).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        error!(%method, %path, %status, ?duration, request_id, "request failed");
    } else {
        info!(%method, %path, %status, ?duration, request_id, "request completed");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
