//! Translation of core failures into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{protocol::ErrorResponse, ServiceError};
use tracing::{error, warn};

use crate::store::StoreError;

/// Handler error: a [`ServiceError`] rendered as an [`ErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(service_error(err))
    }
}

/// Not-found and foreign ownership share one response; integrity failures
/// never name the record to the caller.
fn service_error(err: StoreError) -> ServiceError {
    match err {
        StoreError::Validation(message) => ServiceError::BadRequest(message),
        StoreError::NotFound => ServiceError::NotFound,
        StoreError::Integrity { .. } | StoreError::Format { .. } => {
            ServiceError::IntegrityFailure("stored record failed verification".into())
        }
        StoreError::Sealing(e) => {
            error!(error = %e, "sealing failed");
            ServiceError::Internal("encryption failed".into())
        }
        StoreError::Backend(e) => {
            warn!(error = %e, "storage backend failure");
            ServiceError::Unavailable("storage backend unavailable".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RepoError;
    use uuid::Uuid;

    fn status_of(err: StoreError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn store_errors_map_to_status_codes() {
        assert_eq!(status_of(StoreError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(StoreError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(StoreError::Integrity { id: Uuid::nil() }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(StoreError::Format { id: Uuid::nil() }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(StoreError::Backend(RepoError::Poisoned)),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn integrity_message_does_not_name_the_record() {
        let id = Uuid::new_v4();
        let ApiError(err) = ApiError::from(StoreError::Integrity { id });
        assert!(!err.to_string().contains(&id.to_string()));
    }
}
