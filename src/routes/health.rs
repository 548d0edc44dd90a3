use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::models::{
    AppState, DetailedHealthResponse, HealthResponse, SERVICE_NAME, SERVICE_VERSION,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to Plant Care API",
        "version": SERVICE_VERSION,
        "health": "/health",
        "api": "/api/v1",
    }))
}

/// Basic liveness check for container monitoring.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
    })
}

/// Dependency health as last observed by the background health sweep.
/// Reports 503 when any enabled dependency is down.
async fn detailed_health_check(State(state): State<AppState>) -> Response {
    let dependencies = state.health.read().await.clone();
    let healthy = dependencies.is_healthy();

    let response = DetailedHealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        dependencies,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response)).into_response()
}
