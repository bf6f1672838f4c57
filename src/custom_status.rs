use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// One resolved custom status: an operator-defined result category
/// beyond the five standard TestRail ones, published as its own gauge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomStatusDefinition {
    pub status_id: Option<i64>,
    /// Field on the run payload that carries the count, e.g.
    /// `custom_status5_count`.
    pub field_name: String,
    /// Middle segment of the gauge name `test_run_{metric_name}_count`.
    pub metric_name: String,
    /// Help text on the gauge.
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct CustomStatusFile {
    #[serde(default)]
    custom_statuses: Vec<CustomStatusEntry>,
}

#[derive(Debug, Deserialize)]
struct CustomStatusEntry {
    status_id: Option<i64>,
    field_name: Option<String>,
    metric_name: Option<String>,
    description: Option<String>,
}

/// Load the custom status file into a field-name keyed map.
///
/// Every failure mode degrades to an empty map so the exporter keeps
/// running with the five standard statuses only: a missing file is
/// expected (debug), an unreadable or malformed file is logged as an
/// error, an empty list as a warning. Entries without a `field_name`
/// are skipped; for duplicate field names the first entry wins.
pub fn load_custom_status_config(path: &Path) -> HashMap<String, CustomStatusDefinition> {
    if !path.exists() {
        debug!(
            "Custom status config {:?} not found, no custom statuses configured",
            path
        );
        return HashMap::new();
    }

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            error!("Error reading custom status config {:?}: {}", path, e);
            return HashMap::new();
        }
    };

    let file: CustomStatusFile = match serde_json::from_str(&raw) {
        Ok(file) => file,
        Err(e) => {
            error!("Error parsing custom status config {:?}: {}", path, e);
            return HashMap::new();
        }
    };

    if file.custom_statuses.is_empty() {
        warn!("Custom status config {:?} contains no custom statuses", path);
        return HashMap::new();
    }

    let mut statuses = HashMap::new();
    for entry in file.custom_statuses {
        let field_name = match entry.field_name {
            Some(ref name) if !name.is_empty() => name.clone(),
            _ => {
                warn!("Custom status entry missing 'field_name', skipping: {:?}", entry);
                continue;
            }
        };
        if statuses.contains_key(&field_name) {
            warn!("Duplicate custom status field {:?}, keeping the first entry", field_name);
            continue;
        }

        // `custom_status5_count` publishes as `test_run_custom_status5_count`
        // unless an explicit metric_name overrides the middle segment.
        let metric_name = entry.metric_name.unwrap_or_else(|| {
            field_name
                .strip_suffix("_count")
                .unwrap_or(&field_name)
                .to_string()
        });
        // prometheus rejects an empty help string, so a blank description
        // falls back to the generated one.
        let description = entry
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Number of {} tests", metric_name));

        statuses.insert(
            field_name.clone(),
            CustomStatusDefinition {
                status_id: entry.status_id,
                field_name,
                metric_name,
                description,
            },
        );
    }

    info!("Loaded {} custom status(es) from {:?}", statuses.len(), path);
    statuses
}
