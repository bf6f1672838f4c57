use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("TestRail request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("TestRail response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl IntoResponse for ExporterError {
    fn into_response(self) -> Response {
        let status = match &self {
            ExporterError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ExporterError::Transport(_) => StatusCode::BAD_GATEWAY,
            ExporterError::Decode(_) => StatusCode::BAD_GATEWAY,
            ExporterError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
