use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tokio::signal;
use tracing::{error, info};

use crate::config::constants;
use crate::config::settings::Config;
use crate::error::{AppError, Result};
use crate::handlers;
use crate::server::app_state::AppState;

/// Start the HTTP server and run it until a shutdown signal arrives
pub async fn start_server(app_state: AppState) -> Result<()> {
    let config = app_state.config.clone();
    let addr = config.server.bind_addr();

    info!("Starting HTTP server on {}", addr);

    let state = app_state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            // Middleware stack
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .wrap(middleware::DefaultHeaders::new().add(("X-Version", env!("CARGO_PKG_VERSION"))))
            .wrap(build_cors(&state.config))
            .configure(configure_routes)
    })
    .workers(config.server.workers)
    .keep_alive(Duration::from_secs(constants::HTTP_KEEPALIVE_SECS))
    .shutdown_timeout(constants::HTTP_SHUTDOWN_TIMEOUT_SECS)
    .bind(&addr)
    .map_err(|e| AppError::config(format!("Failed to bind {}: {}", addr, e)))?
    .run();

    print_startup_banner(&config);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
                return Err(AppError::internal(format!("HTTP server error: {}", e)));
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("HTTP server stopped");
    Ok(())
}

/// Route table, shared between the real server and the test harness
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health endpoints
        .route("/health", web::get().to(handlers::health::health_check))
        .route(
            "/health/ready",
            web::get().to(handlers::health::readiness_check),
        )
        // Auth endpoints
        .route(
            "/auth/linkedin",
            web::get().to(handlers::auth_handler::linkedin_login),
        )
        .route(
            "/auth/linkedin/callback",
            web::get().to(handlers::auth_handler::linkedin_callback),
        )
        .route("/auth/me", web::get().to(handlers::auth_handler::me))
        .route(
            "/auth/logout",
            web::post().to(handlers::auth_handler::logout),
        )
        .route(
            "/auth/account",
            web::delete().to(handlers::auth_handler::delete_account),
        )
        // API info endpoint
        .route("/api", web::get().to(handlers::api::api_index));
}

/// Build CORS from the configured origins. A lone "*" opens the API to any
/// origin; credentials stay off on that path because the Cors builder
/// rejects the combination.
fn build_cors(config: &Config) -> Cors {
    let origins = config.server.allowed_origins();
    if origins.iter().any(|o| o == "*") {
        return Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(constants::DEFAULT_CORS_MAX_AGE_SECS as usize);
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(constants::DEFAULT_CORS_MAX_AGE_SECS as usize);
    for origin in &origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

/// Resolve when SIGINT or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}

/// Print startup banner
fn print_startup_banner(config: &Config) {
    println!();
    println!("  linkup-server v{}", env!("CARGO_PKG_VERSION"));
    println!("  listening on http://{}", config.server.bind_addr());
    println!("  storage backend: {:?}", config.storage.backend);
    println!("  workers: {}", config.server.workers);
    println!();

    info!("Startup complete");
}
