//! Price analytics service.
//!
//! Entry point. Loads configuration, initialises structured logging and
//! serves the analytics API until Ctrl-C.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use price_analytics::api::{self, routes::ApiState};
use price_analytics::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("PRICE_ANALYTICS_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    init_logging();

    info!(
        service = %cfg.service.name,
        config = %config_path,
        port = cfg.service.port,
        lookback_days = cfg.forecast.lookback_days,
        horizon_days = cfg.forecast.horizon_days,
        default_period = %cfg.ranking.default_period,
        "Price analytics starting up"
    );

    let state = Arc::new(ApiState::from_config(&cfg));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown signal received.");
    };

    api::serve(state, cfg.service.port, shutdown).await?;

    info!("Price analytics shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("price_analytics=info"));

    let json_logging = std::env::var("PRICE_ANALYTICS_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
