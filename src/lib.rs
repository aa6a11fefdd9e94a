//! Standardized JSON error responses for HTTP services.
//!
//! [`errors`] is the library surface: the status table, the responder, and
//! [`errors::ErrorList`]. The remaining modules make up the demo service.

pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;
