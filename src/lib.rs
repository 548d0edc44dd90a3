// Plant Care API - backend service scaffold for plant care management

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod middleware;
pub mod queue;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
