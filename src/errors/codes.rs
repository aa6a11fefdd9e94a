use axum::http::StatusCode;
use std::fmt;

/// A recognized HTTP error status and its canonical reason phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEntry {
    /// Typed HTTP status
    pub status: StatusCode,
    /// Canonical reason phrase sent as `message`
    pub message: &'static str,
}

impl StatusEntry {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    /// Numeric status code
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.message)
    }
}

/// The closed set of status codes the responder accepts, ordered by code.
///
/// The messages are part of the response contract and intentionally differ
/// from the IANA phrases in places (413 is "Entity Too Large").
pub const STATUS_TABLE: [StatusEntry; 12] = [
    StatusEntry::new(StatusCode::BAD_REQUEST, "Bad Request"),
    StatusEntry::new(StatusCode::UNAUTHORIZED, "Unauthorized"),
    StatusEntry::new(StatusCode::FORBIDDEN, "Forbidden"),
    StatusEntry::new(StatusCode::NOT_FOUND, "Not Found"),
    StatusEntry::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
    StatusEntry::new(StatusCode::PAYLOAD_TOO_LARGE, "Entity Too Large"),
    StatusEntry::new(StatusCode::UNPROCESSABLE_ENTITY, "Unprocessable Entity"),
    StatusEntry::new(StatusCode::FAILED_DEPENDENCY, "Failed Dependency"),
    StatusEntry::new(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"),
    StatusEntry::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
    StatusEntry::new(StatusCode::BAD_GATEWAY, "Bad Gateway"),
    StatusEntry::new(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable"),
];

/// Look up the table entry for a numeric status code
pub fn lookup(code: u16) -> Option<StatusEntry> {
    STATUS_TABLE
        .iter()
        .find(|entry| entry.status.as_u16() == code)
        .copied()
}

/// Whether `code` belongs to the recognized set
pub fn is_recognized(code: u16) -> bool {
    lookup(code).is_some()
}

/// Canonical reason phrase for `code`, if recognized
pub fn message(code: u16) -> Option<&'static str> {
    lookup(code).map(|entry| entry.message)
}

/// All recognized codes in ascending order
pub fn recognized_codes() -> impl Iterator<Item = u16> {
    STATUS_TABLE.iter().map(StatusEntry::code)
}
