//! Extraction of the owner id supplied by upstream authentication.
//!
//! The header value is trusted as-is once present; this service performs no
//! identity verification of its own.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use common::ServiceError;

use super::{error::ApiError, state::AppState};

/// Verified principal id for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

#[async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = state.owner_header_name.as_str();
        let value = parts
            .headers
            .get(header)
            .ok_or_else(|| ServiceError::Unauthorized(format!("missing {header} header")))?;
        let owner = value
            .to_str()
            .map_err(|_| {
                ServiceError::Unauthorized(format!("{header} header contains non-ASCII characters"))
            })?
            .trim();
        if owner.is_empty() {
            return Err(ServiceError::Unauthorized(format!("{header} header is empty")).into());
        }
        Ok(Owner(owner.to_owned()))
    }
}
