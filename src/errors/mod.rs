//! Standardized JSON error responses and error aggregation

pub mod codes;
pub mod list;
pub mod response;
pub mod sink;

pub use codes::{StatusEntry, STATUS_TABLE};
pub use list::{BoxError, ErrorList};
pub use response::{write_error, ErrorResponse, HttpError, Responder};
pub use sink::{BufferedResponse, ResponseSink, SinkError};
