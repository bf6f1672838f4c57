use std::collections::HashMap;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::custom_status::CustomStatusDefinition;

/// Labels on the run-summary info series.
const RUN_INFO_LABELS: &[&str] = &[
    "run_id",
    "name",
    "created_date",
    "passed",
    "failed",
    "retest",
    "untested",
    "blocked",
];

/// Labels on every per-run count series, standard and custom.
const RUN_COUNT_LABELS: &[&str] = &["run_id", "created_date"];

/// Labels on the per-result info series.
const RESULT_INFO_LABELS: &[&str] = &[
    "run_id",
    "test_id",
    "title",
    "status_id",
    "created_date",
    "comment",
];

/// The five standard TestRail result categories, one count gauge each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCountKind {
    Passed,
    Failed,
    Retest,
    Untested,
    Blocked,
}

/// All gauges the exporter publishes, backed by one owned registry.
///
/// The surface is rebuilt from scratch on every collection cycle:
/// `clear_all` drops every sample, then the collector re-sets whatever
/// the current TestRail window contains. Stale runs disappear instead
/// of lingering at their last value.
pub struct TestRailMetrics {
    registry: Registry,
    run_info: GaugeVec,
    run_passed: GaugeVec,
    run_failed: GaugeVec,
    run_retest: GaugeVec,
    run_untested: GaugeVec,
    run_blocked: GaugeVec,
    result_info: GaugeVec,
    /// Dynamic gauges keyed by the run-payload field that feeds them.
    custom: HashMap<String, GaugeVec>,
}

fn register_gauge(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec, prometheus::Error> {
    let gauge = GaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

impl TestRailMetrics {
    /// Build and register the full surface. Dynamic gauges come from the
    /// custom status registry; a gauge name that collides with an already
    /// registered series fails registration and is fatal to startup.
    pub fn new(
        custom_statuses: &HashMap<String, CustomStatusDefinition>,
    ) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let run_info = register_gauge(
            &registry,
            "testrail_run_info",
            "Information about test runs",
            RUN_INFO_LABELS,
        )?;
        let run_passed = register_gauge(
            &registry,
            "test_run_passed_count",
            "Number of passed tests",
            RUN_COUNT_LABELS,
        )?;
        let run_failed = register_gauge(
            &registry,
            "test_run_failed_count",
            "Number of failed tests",
            RUN_COUNT_LABELS,
        )?;
        let run_retest = register_gauge(
            &registry,
            "test_run_retest_count",
            "Number of tests to retest",
            RUN_COUNT_LABELS,
        )?;
        let run_untested = register_gauge(
            &registry,
            "test_run_untested_count",
            "Number of untested tests",
            RUN_COUNT_LABELS,
        )?;
        let run_blocked = register_gauge(
            &registry,
            "test_run_blocked_count",
            "Number of blocked tests",
            RUN_COUNT_LABELS,
        )?;
        let result_info = register_gauge(
            &registry,
            "testrail_test_result",
            "Information about individual test results",
            RESULT_INFO_LABELS,
        )?;

        let mut custom = HashMap::new();
        for (field_name, definition) in custom_statuses {
            let name = format!("test_run_{}_count", definition.metric_name);
            let gauge = register_gauge(&registry, &name, &definition.description, RUN_COUNT_LABELS)?;
            custom.insert(field_name.clone(), gauge);
        }

        Ok(TestRailMetrics {
            registry,
            run_info,
            run_passed,
            run_failed,
            run_retest,
            run_untested,
            run_blocked,
            result_info,
            custom,
        })
    }

    /// Drop every sample from every series, standard and custom.
    pub fn clear_all(&self) {
        self.run_info.reset();
        self.run_passed.reset();
        self.run_failed.reset();
        self.run_retest.reset();
        self.run_untested.reset();
        self.run_blocked.reset();
        self.result_info.reset();
        for gauge in self.custom.values() {
            gauge.reset();
        }
    }

    /// Publish the run-summary row. The counts ride along as labels with
    /// a fixed sample value of 1, which reads as an info row on dashboards.
    #[allow(clippy::too_many_arguments)]
    pub fn set_run_info(
        &self,
        run_id: u64,
        name: &str,
        created_date: &str,
        passed: i64,
        failed: i64,
        retest: i64,
        untested: i64,
        blocked: i64,
    ) -> Result<(), prometheus::Error> {
        self.run_info
            .get_metric_with_label_values(&[
                &run_id.to_string(),
                name,
                created_date,
                &passed.to_string(),
                &failed.to_string(),
                &retest.to_string(),
                &untested.to_string(),
                &blocked.to_string(),
            ])?
            .set(1.0);
        Ok(())
    }

    /// Publish one standard per-run count.
    pub fn set_run_count(
        &self,
        kind: RunCountKind,
        run_id: u64,
        created_date: &str,
        value: i64,
    ) -> Result<(), prometheus::Error> {
        let gauge = match kind {
            RunCountKind::Passed => &self.run_passed,
            RunCountKind::Failed => &self.run_failed,
            RunCountKind::Retest => &self.run_retest,
            RunCountKind::Untested => &self.run_untested,
            RunCountKind::Blocked => &self.run_blocked,
        };
        gauge
            .get_metric_with_label_values(&[&run_id.to_string(), created_date])?
            .set(value as f64);
        Ok(())
    }

    /// Publish one custom status count. A field name with no registered
    /// gauge is a no-op: runs may carry custom fields the operator never
    /// configured.
    pub fn set_custom_count(
        &self,
        field_name: &str,
        run_id: u64,
        created_date: &str,
        value: f64,
    ) -> Result<(), prometheus::Error> {
        if let Some(gauge) = self.custom.get(field_name) {
            gauge
                .get_metric_with_label_values(&[&run_id.to_string(), created_date])?
                .set(value);
        }
        Ok(())
    }

    /// Publish one per-result row, value 1 (see `set_run_info`).
    pub fn set_result_info(
        &self,
        run_id: u64,
        test_id: u64,
        title: &str,
        status_id: i64,
        created_date: &str,
        comment: &str,
    ) -> Result<(), prometheus::Error> {
        self.result_info
            .get_metric_with_label_values(&[
                &run_id.to_string(),
                &test_id.to_string(),
                title,
                &status_id.to_string(),
                created_date,
                comment,
            ])?
            .set(1.0);
        Ok(())
    }

    /// Run-payload field names that have a registered custom gauge.
    pub fn custom_fields(&self) -> impl Iterator<Item = &str> {
        self.custom.keys().map(String::as_str)
    }

    /// Encode the whole surface in the Prometheus text exposition format.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics are not valid UTF-8: {}", e)))
    }
}
