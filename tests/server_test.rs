use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt; // for `oneshot`

use testrail_exporter::config::ExporterConfig;
use testrail_exporter::routes::health::determine_overall_status;
use testrail_exporter::server::build_router;
use testrail_exporter::state::{CollectorStatus, ExporterState, SharedState};

fn test_state() -> SharedState {
    let config = ExporterConfig {
        username: "qa@example.com".to_string(),
        api_key: "secret".to_string(),
        base_url: "https://example.testrail.io/index.php?/api/v2/".to_string(),
        project_id: 3,
        schedule_hours: vec![0, 12],
        port: 9001,
        lookback_days: 7,
        custom_status_config: "custom_statuses.json".into(),
    };
    Arc::new(ExporterState::new(config, &HashMap::new()).unwrap())
}

async fn get(state: SharedState, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = build_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, bytes.to_vec())
}

#[tokio::test]
async fn test_metrics_endpoint_serves_text_format() {
    let state = test_state();
    state
        .metrics
        .set_run_info(42, "Nightly regression", "2024-01-15 10:30:00", 10, 2, 1, 3, 0)
        .unwrap();

    let (status, content_type, bytes) = get(state, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some(prometheus::TEXT_FORMAT));
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("testrail_run_info"));
    assert!(text.contains(r#"run_id="42""#));
}

#[tokio::test]
async fn test_metrics_endpoint_on_empty_surface() {
    let (status, _, bytes) = get(test_state(), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes).unwrap();
    for line in text.lines() {
        assert!(line.is_empty() || line.starts_with('#'));
    }
}

#[tokio::test]
async fn test_health_endpoint_reports_collector_status() {
    let state = test_state();
    {
        let mut collector = state.collector.write().await;
        collector.cycles_completed = 2;
        collector.last_cycle_at = Some(chrono::Utc::now());
        collector.last_cycle_runs = 5;
        collector.last_cycle_results = 37;
    }

    let (status, content_type, bytes) = get(state, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let health: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["project_id"], 3);
    assert_eq!(health["schedule_hours"], serde_json::json!([0, 12]));
    assert_eq!(health["collector"]["cycles_completed"], 2);
    assert_eq!(health["collector"]["last_cycle_runs"], 5);
    assert_eq!(health["collector"]["last_cycle_results"], 37);
    assert!(health["collector"]["last_error"].is_null());
}

#[tokio::test]
async fn test_health_endpoint_before_first_cycle() {
    let (status, _, bytes) = get(test_state(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "starting");
    assert_eq!(health["collector"]["cycles_completed"], 0);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _, _) = get(test_state(), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn test_overall_status_from_collector_state() {
    let mut collector = CollectorStatus::default();
    assert_eq!(determine_overall_status(&collector), "starting");

    collector.cycles_completed = 1;
    assert_eq!(determine_overall_status(&collector), "ok");

    collector.cycles_failed = 1;
    collector.last_error = Some("TestRail request failed".to_string());
    assert_eq!(determine_overall_status(&collector), "degraded");
}
