use crate::config::ExporterConfig;
use crate::custom_status::CustomStatusDefinition;
use crate::error::ExporterError;
use crate::metrics::TestRailMetrics;
use crate::testrail::TestRailClient;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

pub type SharedState = Arc<ExporterState>;

pub struct ExporterState {
    pub config: ExporterConfig,
    pub metrics: TestRailMetrics,
    pub client: TestRailClient,
    pub collector: RwLock<CollectorStatus>,
    pub shutdown_tx: broadcast::Sender<()>,
}

/// Bookkeeping for the collector task, surfaced on `/health`.
#[derive(Debug, Default, Clone)]
pub struct CollectorStatus {
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_cycle_runs: usize,
    pub last_cycle_results: usize,
    pub last_error: Option<String>,
}

impl ExporterState {
    /// Build the metric surface and HTTP client up front. A custom gauge
    /// name that collides with a standard series is fatal here, before
    /// any server or collector starts.
    pub fn new(
        config: ExporterConfig,
        custom_statuses: &HashMap<String, CustomStatusDefinition>,
    ) -> Result<Self, ExporterError> {
        let metrics = TestRailMetrics::new(custom_statuses)?;
        let client = TestRailClient::new(&config)?;
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(ExporterState {
            config,
            metrics,
            client,
            collector: RwLock::new(CollectorStatus::default()),
            shutdown_tx,
        })
    }
}
