use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    dependency, echo_error, health, method_not_allowed, not_found, protected, AppState,
};
use super::middleware::logging_middleware;
use super::openapi::openapi_json;
use crate::metrics;

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/protected", post(protected).fallback(method_not_allowed))
        .route("/dependency", get(dependency).fallback(method_not_allowed))
        .route("/errors/:code", get(echo_error).fallback(method_not_allowed))
        // Metrics endpoint (Prometheus)
        .route(
            "/metrics",
            get(metrics::metrics_handler).fallback(method_not_allowed),
        )
        // OpenAPI documentation
        .route(
            "/api-docs/openapi.json",
            get(openapi_json).fallback(method_not_allowed),
        )
        // Route layer so the metrics middleware sees the matched route
        .route_layer(middleware::from_fn(metrics::middleware::track_metrics))
        .fallback(not_found)
        // Order matters: logging -> cors -> trace
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
