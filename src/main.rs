use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkup_server::{
    config::settings::{Config, LoggingConfig},
    error::{AppError, Result},
    server::cleanup::BlacklistSweeper,
    server::{start_server, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize structured logging
    init_tracing();

    // Build configuration with validation
    let config = Config::load();
    config.validate().map_err(AppError::config)?;

    info!(
        "Starting linkup-server v{} ({:?} storage)",
        env!("CARGO_PKG_VERSION"),
        config.storage.backend
    );

    // Initialize storage and shared state
    let state = AppState::new(config).await?;

    // Periodic blacklist maintenance
    let sweeper = BlacklistSweeper::new(
        state.storage.clone(),
        state.config.auth.blacklist_sweep_interval_secs,
    );
    sweeper.start();

    // Run the HTTP server until shutdown
    match start_server(state).await {
        Ok(()) => {
            info!("Server shutdown completed");
            Ok(())
        }
        Err(e) => {
            error!("Server failed: {}", e);
            Err(e)
        }
    }
}

/// Initialize structured logging from LOG_LEVEL / LOG_FORMAT, with RUST_LOG
/// taking precedence when set
fn init_tracing() {
    let logging = LoggingConfig::load();
    let default_filter = format!("linkup_server={level},{level}", level = logging.level);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    if logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .compact(),
            )
            .init();
    }

    info!("Structured logging initialized with level: {}", logging.level);
}
