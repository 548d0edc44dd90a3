use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plant_care_api::middleware::rate_limiter::{LimiterConfig, RateLimiter};
use plant_care_api::queue::{scheduler, workers::Worker, JobQueue};
use plant_care_api::{config::Config, models::AppState, routes::create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plant_care_api=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Plant Care API starting up...");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    // Wire up the job queue; broker problems fail startup, not requests
    let (jobs, job_rx) = JobQueue::initialize(&config.redis)?;

    // Construct the rate limiter once and share it through state
    let limiter = RateLimiter::new(LimiterConfig::from(&config.rate_limit));
    let state = AppState::new(config.clone(), limiter, jobs);

    // Spawn the background worker and the beat scheduler
    Worker::spawn(state.clone(), job_rx);
    scheduler::spawn_beat(state.clone());

    // Create router
    let app = create_router(state);

    // Start server; ConnectInfo supplies peer addresses to the limiter
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
