use axum::Json;
use utoipa::OpenApi;

use crate::errors::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "httperrors",
        version = "0.1.0",
        description = "Demo service for standardized JSON error responses. Every handled failure is returned as {code, message, reason}.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::protected,
        crate::api::handlers::dependency,
        crate::api::handlers::echo_error,
    ),
    components(
        schemas(ErrorResponse)
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "demo", description = "Endpoints that exercise the error responder"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
