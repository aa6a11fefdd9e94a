use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tower::Service;

use httperrors::api::handlers::AppStateInner;
use httperrors::api::routes::create_router;
use httperrors::api::upstream::UpstreamProbe;
use httperrors::errors::HttpError;

const TEST_TOKEN: &str = "test-token";

/// Upstream that answers after `delay`, or fails with `error`
struct FakeProbe {
    delay: Duration,
    error: Option<io::ErrorKind>,
}

#[async_trait]
impl UpstreamProbe for FakeProbe {
    fn addr(&self) -> &str {
        "fake-upstream:80"
    }

    async fn check(&self) -> io::Result<()> {
        tokio::time::sleep(self.delay).await;
        match self.error {
            Some(kind) => Err(io::Error::from(kind)),
            None => Ok(()),
        }
    }
}

// Helper to create test app
fn create_test_app(probe: FakeProbe) -> Router {
    let state = Arc::new(AppStateInner {
        api_token: TEST_TOKEN.to_string(),
        instance_id: "test-instance".to_string(),
        upstream: Arc::new(probe),
        upstream_timeout: Duration::from_millis(50),
    });

    create_router(state)
}

fn healthy_upstream() -> FakeProbe {
    FakeProbe {
        delay: Duration::ZERO,
        error: None,
    }
}

// Helper to send request and return status, content type and raw body
async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, String, Vec<u8>) {
    let response = app.call(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, body.to_vec())
}

async fn send_json_request(app: &mut Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(app, request).await;
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let mut app = create_test_app(healthy_upstream());
    let (status, body) = send_json_request(&mut app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "httperrors");
    assert_eq!(body["instance_id"], "test-instance");
}

#[tokio::test]
async fn test_protected_without_token() {
    let mut app = create_test_app(healthy_upstream());
    let request = Request::builder()
        .method("POST")
        .uri("/protected")
        .body(Body::empty())
        .unwrap();

    let (status, content_type, body) = send(&mut app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(content_type, "application/json; charset=UTF-8");
    assert_eq!(
        body,
        br#"{"code":401,"message":"Unauthorized","reason":"missing token"}"#
    );
}

#[tokio::test]
async fn test_protected_with_wrong_token() {
    let mut app = create_test_app(healthy_upstream());
    let request = Request::builder()
        .method("POST")
        .uri("/protected")
        .header("authorization", "Bearer nope")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(&mut app, request).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({ "code": 403, "message": "Forbidden", "reason": "invalid token" })
    );
}

#[tokio::test]
async fn test_protected_with_token() {
    let mut app = create_test_app(healthy_upstream());
    let request = Request::builder()
        .method("POST")
        .uri("/protected")
        .header("authorization", format!("Bearer {}", TEST_TOKEN))
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(&mut app, request).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_dependency_timeout() {
    let mut app = create_test_app(FakeProbe {
        delay: Duration::from_secs(5),
        error: None,
    });
    let (status, body) = send_json_request(&mut app, "GET", "/dependency").await;

    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
    assert_eq!(
        body,
        json!({ "code": 424, "message": "Failed Dependency", "reason": "upstream timeout" })
    );
}

#[tokio::test]
async fn test_dependency_refused() {
    let mut app = create_test_app(FakeProbe {
        delay: Duration::ZERO,
        error: Some(io::ErrorKind::ConnectionRefused),
    });
    let (status, body) = send_json_request(&mut app, "GET", "/dependency").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], 502);
    assert_eq!(body["message"], "Bad Gateway");
    assert!(body["reason"]
        .as_str()
        .unwrap()
        .starts_with("upstream unavailable: "));
}

#[tokio::test]
async fn test_dependency_reachable() {
    let mut app = create_test_app(healthy_upstream());
    let (status, body) = send_json_request(&mut app, "GET", "/dependency").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upstream"], "fake-upstream:80");
}

#[tokio::test]
async fn test_echo_every_recognized_code() {
    let mut app = create_test_app(healthy_upstream());

    for entry in httperrors::errors::STATUS_TABLE {
        let uri = format!("/errors/{}?reason=X", entry.code());
        let (status, body) = send_json_request(&mut app, "GET", &uri).await;

        assert_eq!(status, entry.status);
        assert_eq!(
            body,
            json!({ "code": entry.code(), "message": entry.message, "reason": "X" })
        );
    }
}

#[tokio::test]
async fn test_echo_empty_reason() {
    let mut app = create_test_app(healthy_upstream());
    let (status, body) = send_json_request(&mut app, "GET", "/errors/413").await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["message"], "Entity Too Large");
    assert_eq!(body["reason"], "");
}

#[tokio::test]
async fn test_echo_unrecognized_code() {
    let mut app = create_test_app(healthy_upstream());
    let (status, body) = send_json_request(&mut app, "GET", "/errors/418").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "unrecognized status code: 418");
}

#[tokio::test]
async fn test_unknown_route() {
    let mut app = create_test_app(healthy_upstream());
    let (status, body) = send_json_request(&mut app, "GET", "/does/not/exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "code": 404, "message": "Not Found", "reason": "no route for /does/not/exist" })
    );
}

#[tokio::test]
async fn test_request_id_echoed() {
    let mut app = create_test_app(healthy_upstream());
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_metrics_endpoint_counts_errors() {
    let mut app = create_test_app(healthy_upstream());
    send_json_request(&mut app, "GET", "/errors/429").await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&mut app, request).await;
    let text = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("error_responses_total{code=\"429\"}"));
}

#[tokio::test]
async fn test_openapi_document() {
    let mut app = create_test_app(healthy_upstream());
    let (status, body) = send_json_request(&mut app, "GET", "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["components"]["schemas"]["ErrorResponse"].is_object());
}

#[tokio::test]
async fn test_handler_returning_http_error() {
    async fn failing_handler() -> Result<&'static str, HttpError> {
        Err(HttpError::failed_dependency("upstream timeout"))
    }

    let mut app: Router = Router::new().route("/", get(failing_handler));
    let (status, body) = send_json_request(&mut app, "GET", "/").await;

    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
    assert_eq!(body["reason"], "upstream timeout");
}

#[tokio::test]
async fn test_wrong_method_returns_json_405() {
    let mut app = create_test_app(healthy_upstream());
    let request = Request::builder()
        .method("GET")
        .uri("/protected")
        .body(Body::empty())
        .unwrap();

    let (status, content_type, body) = send(&mut app, request).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(content_type, "application/json; charset=UTF-8");
    assert_eq!(
        body,
        json!({
            "code": 405,
            "message": "Method Not Allowed",
            "reason": "method GET not allowed for /protected"
        })
    );

    let (status, body) = send_json_request(&mut app, "POST", "/health").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["reason"], "method POST not allowed for /health");
}

#[tokio::test]
async fn test_protected_lowercase_bearer_scheme() {
    let mut app = create_test_app(healthy_upstream());
    let request = Request::builder()
        .method("POST")
        .uri("/protected")
        .header("authorization", format!("bearer {}", TEST_TOKEN))
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
}
