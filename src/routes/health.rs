use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::{CollectorStatus, SharedState};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub project_id: u64,
    pub schedule_hours: Vec<u32>,
    pub collector: CollectorHealth,
}

#[derive(Serialize)]
pub struct CollectorHealth {
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub last_cycle_at: Option<String>,
    pub last_cycle_runs: usize,
    pub last_cycle_results: usize,
    pub last_error: Option<String>,
}

/// Overall status string from the collector bookkeeping. Pure function
/// extracted for testability.
pub fn determine_overall_status(collector: &CollectorStatus) -> &'static str {
    if collector.cycles_completed == 0 && collector.cycles_failed == 0 {
        "starting"
    } else if collector.last_error.is_none() {
        "ok"
    } else {
        "degraded"
    }
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let collector = state.collector.read().await;

    Json(HealthResponse {
        status: determine_overall_status(&collector).to_string(),
        project_id: state.config.project_id,
        schedule_hours: state.config.schedule_hours.clone(),
        collector: CollectorHealth {
            cycles_completed: collector.cycles_completed,
            cycles_failed: collector.cycles_failed,
            last_cycle_at: collector.last_cycle_at.map(|t| t.to_rfc3339()),
            last_cycle_runs: collector.last_cycle_runs,
            last_cycle_results: collector.last_cycle_results,
            last_error: collector.last_error.clone(),
        },
    })
}
