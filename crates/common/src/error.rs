//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Unauthorized`] → 401
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::PayloadTooLarge`] → 413
/// - [`ServiceError::IntegrityFailure`] → 500
/// - [`ServiceError::Unavailable`] → 503
/// - [`ServiceError::Internal`] → 500
///
/// Messages carried by these variants are returned to callers verbatim, so
/// they must never contain plaintext, key material, or stored envelopes.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed or a field is out of range.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No verified owner identity accompanied the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// No record is visible to the caller. Covers both true absence and a
    /// record owned by someone else; the two are never distinguished.
    #[error("record not found")]
    NotFound,

    /// The request body exceeds the configured size limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// A stored envelope failed authentication or could not be parsed.
    #[error("integrity failure: {0}")]
    IntegrityFailure(String),

    /// The persistence backend is temporarily unavailable.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthorized(_) => 401,
            ServiceError::NotFound => 404,
            ServiceError::PayloadTooLarge(_) => 413,
            ServiceError::IntegrityFailure(_) => 500,
            ServiceError::Unavailable(_) => 503,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Returns the short machine-readable code used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::NotFound => "not_found",
            ServiceError::PayloadTooLarge(_) => "payload_too_large",
            ServiceError::IntegrityFailure(_) => "integrity_failure",
            ServiceError::Unavailable(_) => "service_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}
