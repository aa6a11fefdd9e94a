pub mod middleware;
pub mod registry;

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use crate::errors::HttpError;

pub use registry::{
    init_metrics, ERROR_RESPONSES_TOTAL, ERROR_SERIALIZATION_FALLBACKS_TOTAL,
    HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS,
};

/// Handler for the /metrics endpoint
/// Returns metrics in Prometheus exposition format
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return HttpError::internal_error(format!("failed to encode metrics: {}", e))
            .into_response();
    }

    (
        StatusCode::OK,
        [(CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}
