//! Beat-style scheduler for periodic jobs.
//!
//! The health sweep runs every five minutes; the rate limiter purge runs
//! once per limit window, since entries younger than a window are never
//! eligible for eviction.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use super::jobs::{Job, JobType};
use crate::models::AppState;

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(300);

pub fn spawn_beat(state: AppState) -> tokio::task::JoinHandle<()> {
    let purge_interval = Duration::from_secs(state.config.rate_limit.window_seconds.max(1) as u64);

    tokio::spawn(async move {
        info!("Beat scheduler started");

        let mut health_tick = interval(HEALTH_CHECK_INTERVAL);
        let mut purge_tick = interval(purge_interval);
        health_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        purge_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let job = tokio::select! {
                _ = health_tick.tick() => Job::new(JobType::SystemHealthCheck),
                _ = purge_tick.tick() => Job::new(JobType::PurgeRateLimiter),
            };

            if let Err(error) = state.jobs.enqueue(job).await {
                warn!(%error, "failed to enqueue scheduled job");
            }
        }
    })
}
