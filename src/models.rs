use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::middleware::rate_limiter::RateLimiter;
use crate::queue::JobQueue;

pub const SERVICE_NAME: &str = "plant-care-api";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub limiter: Arc<RateLimiter>,
    pub jobs: JobQueue,
    pub health: Arc<RwLock<HealthSnapshot>>,
}

impl AppState {
    pub fn new(config: Config, limiter: RateLimiter, jobs: JobQueue) -> Self {
        Self {
            config,
            limiter: Arc::new(limiter),
            jobs,
            health: Arc::new(RwLock::new(HealthSnapshot::default())),
        }
    }
}

// API Response types

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, serde::Serialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub dependencies: HealthSnapshot,
}

/// Last observed state of the scaffold's dependencies, refreshed by the
/// background health sweep rather than probed on the request path.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthSnapshot {
    pub redis_broker: DependencyHealth,
    pub worker: DependencyHealth,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DependencyHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Disabled,
    Unknown,
}

impl DependencyHealth {
    pub fn unknown() -> Self {
        Self {
            status: HealthStatus::Unknown,
            checked_at: None,
            error: None,
        }
    }

    pub fn healthy(at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            checked_at: Some(at),
            error: None,
        }
    }

    pub fn unhealthy(at: chrono::DateTime<chrono::Utc>, error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            checked_at: Some(at),
            error: Some(error.into()),
        }
    }

    pub fn disabled() -> Self {
        Self {
            status: HealthStatus::Disabled,
            checked_at: None,
            error: None,
        }
    }
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self {
            redis_broker: DependencyHealth::unknown(),
            worker: DependencyHealth::unknown(),
        }
    }
}

impl HealthSnapshot {
    /// Overall status: unhealthy if any enabled dependency is down.
    pub fn is_healthy(&self) -> bool {
        self.redis_broker.status != HealthStatus::Unhealthy
            && self.worker.status != HealthStatus::Unhealthy
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ApiHealthResponse {
    pub status: String,
    pub version: String,
    pub api_version: String,
    pub dependencies: HealthSnapshot,
}

#[derive(Debug, serde::Serialize)]
pub struct ApiIndexResponse {
    pub message: String,
    pub version: String,
    pub api_version: String,
    pub health: String,
    pub endpoints: Vec<String>,
}
