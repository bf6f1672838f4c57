use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::error;

use crate::config::{ExporterConfig, REQUEST_TIMEOUT_SECS};
use crate::error::ExporterError;

/// Status id TestRail assigns to untested results. Excluded from the
/// per-result series; the run-level untested count covers them.
pub const UNTESTED_STATUS_ID: i64 = 10;

/// One test run as returned by `get_runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Creation time, epoch seconds.
    pub created_on: i64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub passed_count: i64,
    #[serde(default)]
    pub failed_count: i64,
    #[serde(default)]
    pub retest_count: i64,
    #[serde(default)]
    pub untested_count: i64,
    #[serde(default)]
    pub blocked_count: i64,
    /// Everything else TestRail returns on a run, notably the
    /// `custom_status*_count` fields custom statuses read from.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Test id to title record, scoped to one run (`get_tests`).
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: u64,
    pub title: Option<String>,
}

/// One result for a test within a run (`get_results_for_run`).
#[derive(Debug, Clone, Deserialize)]
pub struct TestResult {
    pub test_id: u64,
    pub status_id: i64,
    /// Result time, epoch seconds.
    pub created_on: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunsResponse {
    #[serde(default)]
    runs: Vec<Run>,
}

#[derive(Debug, Deserialize)]
struct TestsResponse {
    #[serde(default)]
    tests: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct ResultsResponse {
    #[serde(default)]
    results: Vec<TestResult>,
}

/// Inclusive epoch-second bounds for run discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: i64,
    pub end: i64,
}

/// Authenticated client for the three TestRail read endpoints the
/// exporter uses. The base URL already carries `index.php?/api/v2/`,
/// so endpoint paths are appended as query-string text and extra
/// parameters join with `&`.
#[derive(Clone)]
pub struct TestRailClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    api_key: String,
}

impl TestRailClient {
    pub fn new(config: &ExporterConfig) -> Result<Self, ExporterError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(TestRailClient {
            http,
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Runs created inside the window, newest API page only. Completion
    /// filtering is the caller's job: TestRail has no server-side filter
    /// for it on this endpoint.
    pub async fn list_runs(
        &self,
        project_id: u64,
        window: &Window,
    ) -> Result<Vec<Run>, ExporterError> {
        let url = format!(
            "{}get_runs/{}&created_after={}&created_before={}",
            self.base_url, project_id, window.start, window.end
        );
        let response: RunsResponse = self.fetch_json(&url, "test runs").await?;
        Ok(response.runs)
    }

    pub async fn list_tests(&self, run_id: u64) -> Result<Vec<TestCase>, ExporterError> {
        let url = format!("{}get_tests/{}", self.base_url, run_id);
        let response: TestsResponse = self.fetch_json(&url, "test cases").await?;
        Ok(response.tests)
    }

    pub async fn list_results(&self, run_id: u64) -> Result<Vec<TestResult>, ExporterError> {
        let url = format!("{}get_results_for_run/{}", self.base_url, run_id);
        let response: ResultsResponse = self.fetch_json(&url, "test results").await?;
        Ok(response.results)
    }

    /// One authenticated GET. Transport failures (connect, timeout,
    /// non-2xx) and decode failures are logged here with their cause;
    /// the caller decides the blast radius (whole cycle vs. single run).
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        what: &str,
    ) -> Result<T, ExporterError> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.api_key))
            .send()
            .await
            .and_then(|response| response.error_for_status());

        let body = match response {
            Ok(response) => response.text().await,
            Err(e) => Err(e),
        }
        .map_err(|e| {
            error!("Error fetching {}: {}", what, e);
            ExporterError::Transport(e)
        })?;

        serde_json::from_str(&body).map_err(|e| {
            error!("Error decoding JSON response for {}: {}", what, e);
            ExporterError::Decode(e)
        })
    }
}
