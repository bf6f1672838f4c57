use clap::Parser;
use std::path::PathBuf;

use testrail_exporter::config::*;

fn base_args() -> CliArgs {
    CliArgs {
        username: "qa@example.com".to_string(),
        api_key: "secret".to_string(),
        base_url: "https://example.testrail.io/index.php?/api/v2/".to_string(),
        project_id: 3,
        schedule_hours: DEFAULT_SCHEDULE_HOURS.to_string(),
        port: DEFAULT_METRICS_PORT,
        lookback_days: DEFAULT_LOOKBACK_DAYS,
        custom_status_config: PathBuf::from(DEFAULT_CUSTOM_STATUS_CONFIG),
    }
}

#[test]
fn test_default_constants() {
    assert_eq!(DEFAULT_METRICS_PORT, 9001);
    assert_eq!(DEFAULT_SCHEDULE_HOURS, "0,12");
    assert_eq!(DEFAULT_LOOKBACK_DAYS, 7);
    assert_eq!(MAX_LOOKBACK_DAYS, 3650);
    assert_eq!(DEFAULT_CUSTOM_STATUS_CONFIG, "custom_statuses.json");
    assert_eq!(REQUEST_TIMEOUT_SECS, 300);
}

#[test]
fn test_config_from_args() {
    let config = ExporterConfig::from_args(base_args()).unwrap();

    assert_eq!(config.username, "qa@example.com");
    assert_eq!(config.project_id, 3);
    assert_eq!(config.schedule_hours, vec![0, 12]);
    assert_eq!(config.port, 9001);
    assert_eq!(config.lookback_days, 7);
    assert_eq!(
        config.custom_status_config,
        PathBuf::from("custom_statuses.json")
    );
}

#[test]
fn test_schedule_hours_sorted_and_deduplicated() {
    let hours = parse_schedule_hours("12,0,12,5").unwrap();
    assert_eq!(hours, vec![0, 5, 12]);
}

#[test]
fn test_schedule_hours_tolerate_whitespace_and_empty_segments() {
    let hours = parse_schedule_hours(" 0 , ,12, ").unwrap();
    assert_eq!(hours, vec![0, 12]);
}

#[test]
fn test_schedule_hour_out_of_range_rejected() {
    assert!(parse_schedule_hours("0,24").is_err());
}

#[test]
fn test_schedule_hour_non_numeric_rejected() {
    assert!(parse_schedule_hours("noon").is_err());
}

#[test]
fn test_schedule_with_no_hours_rejected() {
    assert!(parse_schedule_hours(" , ").is_err());
    assert!(parse_schedule_hours("").is_err());
}

#[test]
fn test_lookback_days_out_of_range_rejected() {
    // A stray epoch timestamp pasted into LOOKBACK_DAYS must fail at
    // startup, not overflow date arithmetic mid-cycle.
    let mut args = base_args();
    args.lookback_days = 1_700_000_000;
    assert!(ExporterConfig::from_args(args).is_err());

    let mut args = base_args();
    args.lookback_days = MAX_LOOKBACK_DAYS + 1;
    assert!(ExporterConfig::from_args(args).is_err());

    let mut args = base_args();
    args.lookback_days = 0;
    assert!(ExporterConfig::from_args(args).is_err());
}

#[test]
fn test_lookback_days_accepted_up_to_the_bound() {
    let mut args = base_args();
    args.lookback_days = MAX_LOOKBACK_DAYS;
    let config = ExporterConfig::from_args(args).unwrap();
    assert_eq!(config.lookback_days, MAX_LOOKBACK_DAYS);
}

#[test]
fn test_base_url_must_parse() {
    let mut args = base_args();
    args.base_url = "not a url".to_string();
    assert!(ExporterConfig::from_args(args).is_err());
}

#[test]
fn test_base_url_must_be_http_or_https() {
    let mut args = base_args();
    args.base_url = "ftp://example.testrail.io/index.php?/api/v2/".to_string();
    assert!(ExporterConfig::from_args(args).is_err());
}

#[test]
fn test_cli_parses_from_flags() {
    let args = CliArgs::try_parse_from([
        "testrail-exporter",
        "--username",
        "qa@example.com",
        "--api-key",
        "secret",
        "--base-url",
        "https://example.testrail.io/index.php?/api/v2/",
        "--project-id",
        "3",
    ])
    .unwrap();

    assert_eq!(args.username, "qa@example.com");
    assert_eq!(args.project_id, 3);
    // Unspecified args fall back to defaults
    assert_eq!(args.port, DEFAULT_METRICS_PORT);
    assert_eq!(args.lookback_days, DEFAULT_LOOKBACK_DAYS);
    assert_eq!(args.schedule_hours, DEFAULT_SCHEDULE_HOURS);
}

#[test]
fn test_cli_rejects_non_numeric_project_id() {
    let result = CliArgs::try_parse_from([
        "testrail-exporter",
        "--username",
        "qa@example.com",
        "--api-key",
        "secret",
        "--base-url",
        "https://example.testrail.io/index.php?/api/v2/",
        "--project-id",
        "three",
    ]);
    assert!(result.is_err());
}
