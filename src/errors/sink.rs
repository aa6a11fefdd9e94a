use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

/// Errors raised by a [`ResponseSink`]
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("response body already written")]
    BodyAlreadyWritten,
}

/// A writable HTTP response target.
///
/// Callers set headers first, then the status, then the body.
pub trait ResponseSink {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Set the status line. Only the first call has any effect.
    fn write_status(&mut self, status: StatusCode);

    fn write_body(&mut self, body: Bytes) -> Result<(), SinkError>;
}

/// In-memory sink that can be turned into an axum [`Response`].
///
/// Also serves as a recorder in tests: the status reads as 200 until written.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Whether anything has been committed to the status line or body
    pub fn is_written(&self) -> bool {
        self.status.is_some() || self.body.is_some()
    }
}

impl ResponseSink for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            Some(existing) => warn!(
                existing = %existing.as_u16(),
                ignored = %status.as_u16(),
                "Superfluous status write"
            ),
            None => self.status = Some(status),
        }
    }

    fn write_body(&mut self, body: Bytes) -> Result<(), SinkError> {
        if self.body.is_some() {
            return Err(SinkError::BodyAlreadyWritten);
        }
        // Writing a body implicitly commits the status line.
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body = Some(body);
        Ok(())
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body.unwrap_or_default()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}
