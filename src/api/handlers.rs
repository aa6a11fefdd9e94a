use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, Method, Uri},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use utoipa::IntoParams;

use super::upstream::UpstreamProbe;
use crate::errors::{codes, HttpError};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub api_token: String,
    pub instance_id: String,
    pub upstream: Arc<dyn UpstreamProbe>,
    pub upstream_timeout: Duration,
}

/// Query parameters for the error echo endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EchoParams {
    /// Reason to include in the error body (default: empty)
    pub reason: Option<String>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "httperrors",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Endpoint requiring a bearer token
#[utoipa::path(
    post,
    path = "/protected",
    tag = "demo",
    responses(
        (status = 200, description = "Token accepted"),
        (status = 401, description = "No bearer token supplied", body = crate::errors::ErrorResponse),
        (status = 403, description = "Bearer token rejected", body = crate::errors::ErrorResponse)
    )
)]
pub async fn protected(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    let token = bearer_token(&headers).ok_or_else(|| HttpError::unauthorized("missing token"))?;

    if token != state.api_token {
        warn!("Rejected request with invalid bearer token");
        return Err(HttpError::forbidden("invalid token"));
    }

    Ok(Json(json!({ "status": "ok" })))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

/// Check that the upstream dependency is reachable
#[utoipa::path(
    get,
    path = "/dependency",
    tag = "demo",
    responses(
        (status = 200, description = "Upstream reachable"),
        (status = 424, description = "Upstream did not answer in time", body = crate::errors::ErrorResponse),
        (status = 502, description = "Upstream refused the connection", body = crate::errors::ErrorResponse)
    )
)]
pub async fn dependency(State(state): State<AppState>) -> Result<Json<Value>, HttpError> {
    let addr = state.upstream.addr().to_string();

    match tokio::time::timeout(state.upstream_timeout, state.upstream.check()).await {
        Ok(Ok(())) => {
            info!(upstream = %addr, "Upstream check succeeded");
            Ok(Json(json!({ "status": "ok", "upstream": addr })))
        }
        Ok(Err(e)) => {
            warn!(upstream = %addr, error = %e, "Upstream check failed");
            Err(HttpError::bad_gateway(format!("upstream unavailable: {}", e)))
        }
        Err(_) => {
            warn!(
                upstream = %addr,
                timeout_ms = %state.upstream_timeout.as_millis(),
                "Upstream check timed out"
            );
            Err(HttpError::failed_dependency("upstream timeout"))
        }
    }
}

/// Respond with the error body for any recognized status code
#[utoipa::path(
    get,
    path = "/errors/{code}",
    tag = "demo",
    params(
        ("code" = String, Path, description = "Status code to respond with"),
        EchoParams
    ),
    responses(
        (status = 400, description = "Unrecognized code, or the requested 400", body = crate::errors::ErrorResponse),
        (status = 500, description = "The requested error", body = crate::errors::ErrorResponse)
    )
)]
pub async fn echo_error(Path(code): Path<String>, Query(params): Query<EchoParams>) -> HttpError {
    match code.parse::<u16>() {
        Ok(code) if codes::is_recognized(code) => {
            HttpError::new(code, params.reason.unwrap_or_default())
        }
        _ => HttpError::bad_request(format!("unrecognized status code: {}", code)),
    }
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> HttpError {
    HttpError::not_found(format!("no route for {}", uri.path()))
}

/// Fallback for known routes called with an unsupported method
pub async fn method_not_allowed(method: Method, uri: Uri) -> HttpError {
    HttpError::new(
        405,
        format!("method {} not allowed for {}", method, uri.path()),
    )
}
