use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // Prometheus scrape endpoint
        .route("/metrics", get(crate::routes::metrics::metrics))
        // Exporter health
        .route("/health", get(crate::routes::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
