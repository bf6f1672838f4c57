mod collector;
mod config;
mod custom_status;
mod error;
mod metrics;
mod routes;
mod scheduler;
mod server;
mod state;
mod testrail;

use clap::Parser;
use std::sync::Arc;
use tracing::info;

use config::{CliArgs, ExporterConfig};
use state::ExporterState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "testrail_exporter=info,tower_http=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    info!("Starting testrail-exporter v{}", env!("CARGO_PKG_VERSION"));

    let config = ExporterConfig::from_args(args)?;
    let port = config.port;
    info!("TestRail base URL: {}", config.base_url);
    info!("Project id: {}", config.project_id);
    info!("Schedule hours (UTC): {:?}", config.schedule_hours);
    info!("Lookback days: {}", config.lookback_days);

    let custom_statuses = custom_status::load_custom_status_config(&config.custom_status_config);
    info!("Custom statuses configured: {}", custom_statuses.len());

    let state = Arc::new(ExporterState::new(config, &custom_statuses)?);

    // Collector runs one immediate cycle, then follows the schedule.
    let _collector_handle = scheduler::spawn_collector(state.clone());

    // Build and start the metrics server
    let router = server::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Metrics server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    info!("Exporter shutting down");

    Ok(())
}

async fn shutdown_signal(state: Arc<ExporterState>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    ctrl_c.await;
    info!("Received shutdown signal");

    // Stops the collector between cycles; an in-flight cycle finishes.
    let _ = state.shutdown_tx.send(());
}
