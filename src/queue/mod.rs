//! Background job wiring.
//!
//! Jobs flow through a bounded in-process channel drained by a single
//! worker task; a beat-style scheduler enqueues the periodic housekeeping
//! jobs. When the job queue is enabled (`USE_JOB_QUEUE`), a redis broker
//! client is wired in and watched by the health sweep.

pub mod jobs;
pub mod scheduler;
pub mod workers;

use tokio::sync::mpsc;

use crate::config::RedisConfig;
use crate::error::{AppError, AppResult};
use jobs::Job;

const QUEUE_DEPTH: usize = 64;

#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<Job>,
    redis: Option<redis::Client>,
}

impl JobQueue {
    /// Two-phase construction: broker wiring is validated here, once,
    /// before the server accepts traffic. A bad broker URL fails startup
    /// instead of surfacing lazily on the first job.
    pub fn initialize(config: &RedisConfig) -> AppResult<(Self, mpsc::Receiver<Job>)> {
        let redis = if config.enabled {
            let client = redis::Client::open(config.url.as_str())
                .map_err(|e| AppError::Config(format!("invalid redis broker url: {e}")))?;
            Some(client)
        } else {
            None
        };

        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        Ok((Self { tx, redis }, rx))
    }

    pub async fn enqueue(&self, job: Job) -> AppResult<()> {
        self.tx
            .send(job)
            .await
            .map_err(|e| AppError::Queue(format!("enqueue failed: {e}")))
    }

    pub fn redis_client(&self) -> Option<&redis::Client> {
        self.redis.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::jobs::JobType;

    #[tokio::test]
    async fn initialize_rejects_malformed_broker_url() {
        let config = RedisConfig {
            url: "not-a-redis-url".to_string(),
            enabled: true,
        };
        assert!(JobQueue::initialize(&config).is_err());
    }

    #[tokio::test]
    async fn disabled_queue_skips_broker_but_still_carries_jobs() {
        let (queue, mut rx) = JobQueue::initialize(&RedisConfig::default()).unwrap();
        assert!(queue.redis_client().is_none());

        queue.enqueue(Job::new(JobType::PurgeRateLimiter)).await.unwrap();
        let job = rx.recv().await.unwrap();
        assert_eq!(job.job_type, JobType::PurgeRateLimiter);
    }
}
