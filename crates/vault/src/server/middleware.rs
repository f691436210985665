//! Request limits applied to the router.
//!
//! Body size and timeout are enforced here, before any call reaches the
//! record store.

use std::time::Duration;

/// Default per-request timeout applied to all routes.
///
/// A timeout abandons the response only. A store call already handed to the
/// blocking pool runs to completion, so a write answered with 408 may still
/// commit. Clients should re-read before retrying a create.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum request body size.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Transport-level limits, taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_body_bytes: MAX_BODY_BYTES,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}
