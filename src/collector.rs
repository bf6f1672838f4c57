use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info};

use crate::error::ExporterError;
use crate::metrics::{RunCountKind, TestRailMetrics};
use crate::state::ExporterState;
use crate::testrail::{Run, Window, UNTESTED_STATUS_ID};

/// Title label used when a result's test id has no matching test case,
/// or the case itself carries no title.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// What one successful cycle published, recorded in `CollectorStatus`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleStats {
    pub runs_published: usize,
    pub results_published: usize,
}

/// Run one collection cycle and record its outcome in shared state.
/// Never fails: a failed cycle leaves the surface empty until the next
/// trigger and shows up in `last_error` on `/health`.
pub async fn collect_once(state: &ExporterState) {
    info!("Starting TestRail data collection");
    let outcome = run_cycle(state).await;

    let mut status = state.collector.write().await;
    status.last_cycle_at = Some(Utc::now());
    match outcome {
        Ok(stats) => {
            status.cycles_completed += 1;
            status.last_cycle_runs = stats.runs_published;
            status.last_cycle_results = stats.results_published;
            status.last_error = None;
            info!(
                "TestRail data collection finished: {} run(s), {} result(s) published",
                stats.runs_published, stats.results_published
            );
        }
        Err(e) => {
            status.cycles_failed += 1;
            status.last_cycle_runs = 0;
            status.last_cycle_results = 0;
            status.last_error = Some(e.to_string());
            error!("TestRail data collection failed: {}", e);
        }
    }
}

/// One full cycle: clear the surface, list runs in the lookback window,
/// republish every completed run and its results.
///
/// A failed run listing aborts the cycle with the surface already
/// cleared. Failures fetching one run's tests or results skip only that
/// run's result series; its summary series stay published and later
/// runs are still processed.
async fn run_cycle(state: &ExporterState) -> Result<CycleStats, ExporterError> {
    let config = &state.config;
    let metrics = &state.metrics;

    metrics.clear_all();

    let now = Utc::now();
    let window = Window {
        start: (now - Duration::days(i64::from(config.lookback_days))).timestamp(),
        end: now.timestamp(),
    };

    let runs = state.client.list_runs(config.project_id, &window).await?;

    let mut stats = CycleStats::default();
    for run in &runs {
        if !run.is_completed {
            continue;
        }
        debug!("Parsing test run id={} name={:?}", run.id, run.name);

        let created_date = format_timestamp(run.created_on);
        publish_run(metrics, run, &created_date)?;
        stats.runs_published += 1;

        let cases = match state.client.list_tests(run.id).await {
            Ok(cases) => cases,
            Err(_) => continue,
        };
        debug!("Parsing {} test case(s) for run id={}", cases.len(), run.id);
        let titles: HashMap<u64, String> = cases
            .into_iter()
            .map(|case| {
                let title = case.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());
                (case.id, title)
            })
            .collect();

        let results = match state.client.list_results(run.id).await {
            Ok(results) => results,
            Err(_) => continue,
        };
        debug!("Parsing {} test result(s) for run id={}", results.len(), run.id);

        for result in &results {
            if result.status_id == UNTESTED_STATUS_ID {
                continue;
            }
            let title = titles
                .get(&result.test_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
            metrics.set_result_info(
                run.id,
                result.test_id,
                &title,
                result.status_id,
                &format_timestamp(result.created_on),
                result.comment.as_deref().unwrap_or(""),
            )?;
            stats.results_published += 1;
        }
    }

    Ok(stats)
}

/// Publish the summary series for one completed run: the info row, the
/// five standard counts, and any configured custom counts the payload
/// carries.
fn publish_run(
    metrics: &TestRailMetrics,
    run: &Run,
    created_date: &str,
) -> Result<(), prometheus::Error> {
    metrics.set_run_info(
        run.id,
        &run.name,
        created_date,
        run.passed_count,
        run.failed_count,
        run.retest_count,
        run.untested_count,
        run.blocked_count,
    )?;
    metrics.set_run_count(RunCountKind::Passed, run.id, created_date, run.passed_count)?;
    metrics.set_run_count(RunCountKind::Failed, run.id, created_date, run.failed_count)?;
    metrics.set_run_count(RunCountKind::Retest, run.id, created_date, run.retest_count)?;
    metrics.set_run_count(
        RunCountKind::Untested,
        run.id,
        created_date,
        run.untested_count,
    )?;
    metrics.set_run_count(
        RunCountKind::Blocked,
        run.id,
        created_date,
        run.blocked_count,
    )?;

    for field_name in metrics.custom_fields() {
        let Some(value) = run.extra.get(field_name) else {
            continue;
        };
        match value.as_f64() {
            Some(count) => {
                metrics.set_custom_count(field_name, run.id, created_date, count)?;
                debug!(
                    "Set custom status {}={} for run id={}",
                    field_name, count, run.id
                );
            }
            None => debug!(
                "Custom status {} on run id={} is not numeric, skipping",
                field_name, run.id
            ),
        }
    }

    Ok(())
}

/// Epoch seconds as a human-readable UTC date, e.g. `2024-01-15 10:30:00`.
/// Falls back to the raw value when it is outside chrono's range.
pub fn format_timestamp(epoch_seconds: i64) -> String {
    match DateTime::<Utc>::from_timestamp(epoch_seconds, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch_seconds.to_string(),
    }
}
