use std::time::Duration;

use covid_api::{build_router, build_state, config::Config, service::spawn_periodic_refresh};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let state = match build_state(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Startup failed: {e}");
            std::process::exit(1);
        }
    };

    if config.refresh_interval_secs > 0 {
        info!(
            "Refreshing snapshot every {}s",
            config.refresh_interval_secs
        );
        spawn_periodic_refresh(
            state.clone(),
            Duration::from_secs(config.refresh_interval_secs),
        );
    }

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!("Server running on http://{}", addr);
    info!("API Endpoints:");
    info!("  GET    /health                          - Health check");
    info!("  GET    /updateCovidCases                - Refresh stored snapshot");
    info!("  GET    /covidData?coordinates=lat,lon   - Cases for a location");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
    }

    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
