use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mytreno::config::{AppConfig, Entry};
use mytreno::registry::Registry;
use mytreno::viaggiatreno::ViaggiaTrenoClient;
use mytreno::web::{AppState, create_router};

/// Config file used when `MYTRENO_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "mytreno.json";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "mytreno failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config_path =
        std::env::var("MYTRENO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config =
        AppConfig::load_or_default(&config_path)?.with_overrides(|key| std::env::var(key).ok())?;

    let client_config = config.client_config();
    let client = ViaggiaTrenoClient::new(&client_config)?;
    info!(base_url = %client.base_url(), "ViaggiaTreno client ready");

    let mut registry = Registry::new();
    registry.start_global_train(client.clone());
    for entry in &config.entries {
        match entry {
            Entry::Station {
                station_id,
                station_name,
            } => {
                let name = station_name.as_deref().unwrap_or(station_id);
                registry.start_station(
                    client.clone(),
                    station_id,
                    name,
                    client_config.status_policy,
                );
            }
            Entry::Train { train_number } => {
                registry.start_static_train(client.clone(), train_number.trim());
            }
        }
    }
    info!(sensors = registry.len(), "Sensors started");

    let registry = Arc::new(registry);
    let app = create_router(AppState::new(registry.clone()));

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!(addr = %config.listen, "mytreno listening");
    info!("  GET  /health");
    info!("  GET  /api/sensors");
    info!("  GET  /api/sensors/:scope");
    info!("  POST /api/services/set_train");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and its state are gone once serve returns.
    match Arc::try_unwrap(registry) {
        Ok(mut registry) => registry.shutdown().await,
        Err(_) => warn!("Registry still shared, coordinators stop when it drops"),
    }

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
