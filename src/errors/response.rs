use axum::{
    body::Bytes,
    http::{
        header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error};
use utoipa::ToSchema;

use super::codes::{self, StatusEntry};
use super::sink::{BufferedResponse, ResponseSink};
use crate::metrics::{ERROR_RESPONSES_TOTAL, ERROR_SERIALIZATION_FALLBACKS_TOTAL};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
pub const PLAIN_TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// JSON error body written by [`write_error`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status code
    #[schema(example = 404)]
    pub code: u16,
    /// Canonical reason phrase for the status code
    #[schema(example = "Not Found")]
    pub message: String,
    /// Explanation of this particular failure
    #[schema(example = "Could not find user")]
    pub reason: String,
}

/// Encodes an [`ErrorResponse`] into the response body
pub type Serializer = fn(&ErrorResponse) -> serde_json::Result<Vec<u8>>;

fn json_serializer(body: &ErrorResponse) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(body)
}

/// Writes JSON error responses for the codes in [`codes::STATUS_TABLE`]
#[derive(Clone, Copy)]
pub struct Responder {
    serialize: Serializer,
}

impl Default for Responder {
    fn default() -> Self {
        Self {
            serialize: json_serializer,
        }
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder").finish_non_exhaustive()
    }
}

impl Responder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Responder using a custom body encoder
    pub fn with_serializer(serialize: Serializer) -> Self {
        Self { serialize }
    }

    /// Write a JSON error response for `code` to `sink`.
    ///
    /// Given 404 and "Could not find user", the body is
    /// `{"code":404,"message":"Not Found","reason":"Could not find user"}`.
    ///
    /// # Panics
    ///
    /// Panics if `code` is not in the status table. Passing an unknown code
    /// is a bug in the caller, and nothing is written to `sink`.
    pub fn write_error<S>(&self, sink: &mut S, code: u16, reason: &str)
    where
        S: ResponseSink + ?Sized,
    {
        let entry = match codes::lookup(code) {
            Some(entry) => entry,
            None => panic!("invalid error code: {}", code),
        };

        let body = ErrorResponse {
            code,
            message: entry.message.to_string(),
            reason: reason.to_string(),
        };

        match (self.serialize)(&body) {
            Ok(bytes) => {
                sink.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                sink.write_status(entry.status);
                // Body write failures are not reported to the caller.
                let _ = sink.write_body(Bytes::from(bytes));
            }
            Err(e) => {
                error!(code = %code, error = %e, "Failed to serialize error response");
                ERROR_SERIALIZATION_FALLBACKS_TOTAL.inc();
                write_plain_error(sink, entry.status, reason);
            }
        }

        debug!(code = %code, reason = %reason, "Error response written");
        ERROR_RESPONSES_TOTAL
            .with_label_values(&[&code.to_string()])
            .inc();
    }
}

/// Plain-text error with the raw reason as body
fn write_plain_error<S>(sink: &mut S, status: StatusCode, reason: &str)
where
    S: ResponseSink + ?Sized,
{
    let headers = sink.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(PLAIN_TEXT_CONTENT_TYPE));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    sink.write_status(status);
    let _ = sink.write_body(Bytes::from(format!("{}\n", reason)));
}

/// Write a JSON error response using the default serde_json encoder.
///
/// See [`Responder::write_error`].
pub fn write_error<S>(sink: &mut S, code: u16, reason: &str)
where
    S: ResponseSink + ?Sized,
{
    Responder::default().write_error(sink, code, reason)
}

/// An error that renders as a JSON error response when returned from a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    entry: StatusEntry,
    reason: String,
}

impl HttpError {
    /// # Panics
    ///
    /// Panics if `code` is not in the status table.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        match codes::lookup(code) {
            Some(entry) => Self {
                entry,
                reason: reason.into(),
            },
            None => panic!("invalid error code: {}", code),
        }
    }

    pub fn code(&self) -> u16 {
        self.entry.code()
    }

    pub fn status(&self) -> StatusCode {
        self.entry.status
    }

    pub fn message(&self) -> &'static str {
        self.entry.message
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Helpers for common errors
impl HttpError {
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::new(400, reason)
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::new(401, reason)
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::new(403, reason)
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::new(404, reason)
    }

    pub fn failed_dependency(reason: impl Into<String>) -> Self {
        Self::new(424, reason)
    }

    pub fn internal_error(reason: impl Into<String>) -> Self {
        Self::new(500, reason)
    }

    pub fn bad_gateway(reason: impl Into<String>) -> Self {
        Self::new(502, reason)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entry, self.reason)
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut sink = BufferedResponse::new();
        write_error(&mut sink, self.code(), &self.reason);
        sink.into_response()
    }
}
