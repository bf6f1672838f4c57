use clap::Parser;
use std::path::PathBuf;
use url::Url;

use crate::error::ExporterError;

/// TestRail Exporter — republishes TestRail run results as Prometheus metrics.
#[derive(Parser, Debug, Clone)]
#[command(name = "testrail-exporter")]
pub struct CliArgs {
    /// TestRail username for API auth
    #[arg(long = "username", env = "TESTRAIL_USERNAME")]
    pub username: String,

    /// TestRail API key for API auth
    #[arg(long = "api-key", env = "TESTRAIL_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// TestRail API base URL, e.g. https://example.testrail.io/index.php?/api/v2/
    #[arg(long = "base-url", env = "TESTRAIL_BASE_URL")]
    pub base_url: String,

    /// TestRail project to collect runs from
    #[arg(long = "project-id", env = "TESTRAIL_PROJECT_ID")]
    pub project_id: u64,

    /// Comma-separated UTC hours at which collection cycles run
    #[arg(long = "schedule-hours", env = "SCHEDULE_CRON", default_value = DEFAULT_SCHEDULE_HOURS)]
    pub schedule_hours: String,

    /// Metrics HTTP port
    #[arg(long = "port", env = "METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub port: u16,

    /// How many days back to look for completed runs
    #[arg(long = "lookback-days", env = "LOOKBACK_DAYS", default_value_t = DEFAULT_LOOKBACK_DAYS)]
    pub lookback_days: u32,

    /// Path to the custom status configuration file
    #[arg(
        long = "custom-status-config",
        env = "CUSTOM_STATUS_CONFIG",
        default_value = DEFAULT_CUSTOM_STATUS_CONFIG
    )]
    pub custom_status_config: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub username: String,
    pub api_key: String,
    pub base_url: String,
    pub project_id: u64,
    /// Sorted, deduplicated UTC hours (0-23) at which cycles fire.
    pub schedule_hours: Vec<u32>,
    pub port: u16,
    pub lookback_days: u32,
    pub custom_status_config: PathBuf,
}

// Server constants
pub const DEFAULT_METRICS_PORT: u16 = 9001;

// Collection constants
pub const DEFAULT_SCHEDULE_HOURS: &str = "0,12";
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;
pub const MAX_LOOKBACK_DAYS: u32 = 3650; // 10 years
pub const DEFAULT_CUSTOM_STATUS_CONFIG: &str = "custom_statuses.json";
pub const REQUEST_TIMEOUT_SECS: u64 = 300; // 5 minutes

impl ExporterConfig {
    pub fn from_args(args: CliArgs) -> Result<Self, ExporterError> {
        let url = Url::parse(&args.base_url).map_err(|e| {
            ExporterError::Config(format!("invalid base URL {:?}: {}", args.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ExporterError::Config(format!(
                "base URL {:?} must use http or https",
                args.base_url
            )));
        }

        let schedule_hours = parse_schedule_hours(&args.schedule_hours)?;

        if args.lookback_days == 0 || args.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ExporterError::Config(format!(
                "lookback days {} is out of range 1-{}",
                args.lookback_days, MAX_LOOKBACK_DAYS
            )));
        }

        Ok(ExporterConfig {
            username: args.username,
            api_key: args.api_key,
            base_url: args.base_url,
            project_id: args.project_id,
            schedule_hours,
            port: args.port,
            lookback_days: args.lookback_days,
            custom_status_config: args.custom_status_config,
        })
    }
}

/// Parse a comma-separated list of UTC hours ("0,12") into a sorted,
/// deduplicated list. Empty segments are tolerated; an empty result or
/// an hour outside 0-23 is a configuration error.
pub fn parse_schedule_hours(raw: &str) -> Result<Vec<u32>, ExporterError> {
    let mut hours: Vec<u32> = Vec::new();

    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let hour: u32 = part.parse().map_err(|_| {
            ExporterError::Config(format!("invalid schedule hour {:?} in {:?}", part, raw))
        })?;
        if hour > 23 {
            return Err(ExporterError::Config(format!(
                "schedule hour {} in {:?} is out of range 0-23",
                hour, raw
            )));
        }
        if !hours.contains(&hour) {
            hours.push(hour);
        }
    }

    if hours.is_empty() {
        return Err(ExporterError::Config(format!(
            "schedule {:?} contains no hours",
            raw
        )));
    }

    hours.sort_unstable();
    Ok(hours)
}
