#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::time::Instant;

    use fieldops_schedule::{
        AvailabilityResolver, EngineConfig, FieldOpsSnapshot, ServerConfig,
        http_api::{self, AppState, RateLimiter},
        load_snapshot_from_json, logging,
    };
    use tracing::{debug, info};

    logging::init_tracing("info");

    let config = ServerConfig::from_env()?;
    let engine = match &config.engine_config_path {
        Some(path) => EngineConfig::load_from_json(path)?,
        None => EngineConfig::default(),
    };
    let snapshot = match &config.snapshot_path {
        Some(path) => load_snapshot_from_json(path)?,
        None => FieldOpsSnapshot::default(),
    };

    let state = AppState::new(
        snapshot,
        AvailabilityResolver::new(engine),
        RateLimiter::new(config.rate_limit_requests, config.rate_limit_window),
    );

    let limiter = state.limiter();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        loop {
            interval.tick().await;
            let removed = limiter.sweep_expired(Instant::now());
            debug!(removed, "rate limiter sweep");
        }
    });

    info!(
        addr = %config.addr,
        rate_limit = config.rate_limit_requests,
        "starting fieldops HTTP API"
    );
    http_api::serve(config.addr, state).await?;
    Ok(())
}

