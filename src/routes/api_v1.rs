//! Versioned API surface.
//!
//! Domain routers (plants, care schedules, diagnosis, ...) mount here as
//! they are implemented; for now the scaffold exposes the index and a
//! versioned health aggregation.

use axum::{extract::State, routing::get, Json, Router};

use crate::models::{ApiHealthResponse, ApiIndexResponse, AppState, SERVICE_VERSION};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/", get(api_index))
        .route("/api/v1/health", get(api_health_check))
        .with_state(state)
}

async fn api_index() -> Json<ApiIndexResponse> {
    Json(ApiIndexResponse {
        message: "Plant Care API v1".to_string(),
        version: SERVICE_VERSION.to_string(),
        api_version: "v1".to_string(),
        health: "/api/v1/health".to_string(),
        endpoints: vec!["/api/v1/".to_string(), "/api/v1/health".to_string()],
    })
}

async fn api_health_check(State(state): State<AppState>) -> Json<ApiHealthResponse> {
    let dependencies = state.health.read().await.clone();

    Json(ApiHealthResponse {
        status: if dependencies.is_healthy() {
            "healthy"
        } else {
            "unhealthy"
        }
        .to_string(),
        version: SERVICE_VERSION.to_string(),
        api_version: "v1".to_string(),
        dependencies,
    })
}
