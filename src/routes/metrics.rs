use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::ExporterError;
use crate::state::SharedState;

/// Prometheus scrape endpoint. Serves whatever the last collection
/// cycle published; scrapes never trigger collection and keep working
/// while a cycle is in flight or failing.
pub async fn metrics(State(state): State<SharedState>) -> Result<impl IntoResponse, ExporterError> {
    let body = state.metrics.gather()?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
