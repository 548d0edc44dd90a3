//! Worker loop for the background job queue.

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::jobs::{Job, JobType};
use crate::models::{AppState, DependencyHealth};
use crate::utils::with_retry;

pub struct Worker {
    state: AppState,
}

impl Worker {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn spawn(state: AppState, rx: mpsc::Receiver<Job>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { Worker::new(state).run(rx).await })
    }

    pub async fn run(self, mut rx: mpsc::Receiver<Job>) {
        info!("Job worker started");

        while let Some(job) = rx.recv().await {
            if let Err(error) = self.process_job(&job).await {
                warn!(job_type = %job.job_type, %error, "job failed");
            }
        }

        info!("Job worker stopped: queue closed");
    }

    pub async fn process_job(&self, job: &Job) -> anyhow::Result<()> {
        debug!(job_type = %job.job_type, "processing job");

        match job.job_type {
            JobType::SystemHealthCheck => self.run_system_health_check().await,
            JobType::PurgeRateLimiter => self.run_limiter_purge().await,
        }
    }

    /// Periodic health sweep: probe the broker (when enabled) and record
    /// the snapshot that `/health/detailed` serves.
    async fn run_system_health_check(&self) -> anyhow::Result<()> {
        let now = chrono::Utc::now();

        let redis_broker = match self.state.jobs.redis_client() {
            None => DependencyHealth::disabled(),
            Some(client) => {
                let client = client.clone();
                let ping = with_retry(
                    move || {
                        let client = client.clone();
                        async move { ping_broker(client).await }.boxed()
                    },
                    3,
                )
                .await;

                match ping {
                    Ok(()) => DependencyHealth::healthy(now),
                    Err(error) => {
                        warn!(%error, "redis broker check failed");
                        DependencyHealth::unhealthy(now, error.to_string())
                    }
                }
            }
        };

        let mut snapshot = self.state.health.write().await;
        snapshot.redis_broker = redis_broker;
        // The sweep running at all is the worker liveness signal
        snapshot.worker = DependencyHealth::healthy(now);

        info!(
            healthy = snapshot.is_healthy(),
            "system health check completed"
        );
        Ok(())
    }

    async fn run_limiter_purge(&self) -> anyhow::Result<()> {
        let now = chrono::Utc::now().timestamp();
        let evicted = self.state.limiter.purge(now);

        debug!(
            evicted,
            tracked = self.state.limiter.tracked_clients(),
            "rate limiter purge completed"
        );
        Ok(())
    }
}

async fn ping_broker(client: redis::Client) -> anyhow::Result<()> {
    let mut conn = client.get_connection_manager().await?;
    let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
    anyhow::ensure!(reply == "PONG", "unexpected ping reply: {reply}");
    Ok(())
}
