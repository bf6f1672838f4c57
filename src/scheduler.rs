use chrono::{DateTime, Timelike, Utc};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::collector;
use crate::state::SharedState;

const SECS_PER_DAY: u32 = 86_400;

/// Spawn the collector task: one cycle immediately on startup, then one
/// at every configured UTC hour until shutdown. Cycles are never
/// cancelled mid-flight; shutdown lands between them.
pub fn spawn_collector(state: SharedState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut shutdown_rx = state.shutdown_tx.subscribe();
        info!(
            "Collector started, schedule hours (UTC): {:?}",
            state.config.schedule_hours
        );

        collector::collect_once(&state).await;

        loop {
            let delay = next_trigger_delay(&state.config.schedule_hours, Utc::now());
            debug!("Next collection cycle in {}s", delay.as_secs());

            tokio::select! {
                _ = sleep(delay) => {
                    collector::collect_once(&state).await;
                }
                _ = shutdown_rx.recv() => {
                    info!("Collector stopping");
                    break;
                }
            }
        }
    })
}

/// Delay until the next `hh:00:00` UTC strictly after `now`, where `hh`
/// ranges over the configured hours (sorted, 0-23). Wraps to the first
/// hour of the next day when every hour today has passed. Whole-second
/// resolution; never returns zero.
pub fn next_trigger_delay(hours: &[u32], now: DateTime<Utc>) -> Duration {
    let now_secs = now.num_seconds_from_midnight();

    for &hour in hours {
        let fire = hour * 3600;
        if fire > now_secs {
            return Duration::from_secs(u64::from(fire - now_secs));
        }
    }

    let first = hours.first().copied().unwrap_or(0);
    let fire = first * 3600 + SECS_PER_DAY;
    Duration::from_secs(u64::from(fire - now_secs))
}
