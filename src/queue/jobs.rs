// Job definitions for the background queue

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_type: JobType,
    pub enqueued_at: chrono::DateTime<chrono::Utc>,
}

impl Job {
    pub fn new(job_type: JobType) -> Self {
        Self {
            job_type,
            enqueued_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    SystemHealthCheck,
    PurgeRateLimiter,
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobType::SystemHealthCheck => write!(f, "system_health_check"),
            JobType::PurgeRateLimiter => write!(f, "purge_rate_limiter"),
        }
    }
}
