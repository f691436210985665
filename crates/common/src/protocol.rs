//! Request and response types exchanged over the public HTTP API.
//!
//! None of these types ever carries a stored envelope. `sensitive_text`
//! fields hold decrypted plaintext and only travel to the record's owner.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Request body for `POST /records`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    /// Short plain-text title, 1..=255 characters after sanitisation.
    pub title: String,
    /// Confidential description. Omitted means empty.
    #[serde(default)]
    pub sensitive_text: String,
}

/// Request body for `PATCH /records/{id}`.
///
/// Absent (or `null`) fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRecordRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Query string for `GET /records`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRecordsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A record as returned to its owner, with the description decrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResponse {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub sensitive_text: String,
    pub completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// Response body for `GET /records`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRecordsResponse {
    /// Records ordered newest first.
    pub items: Vec<RecordResponse>,
    /// Effective page size used by the query.
    pub limit: u32,
    /// Effective offset used by the query.
    pub offset: u32,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"not_found"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the database answered a liveness probe.
    pub db_ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;
    use serde_json::json;

    #[test]
    fn create_request_defaults_sensitive_text_to_empty() {
        let req: CreateRecordRequest = serde_json::from_value(json!({"title": "Buy milk"})).unwrap();
        assert_eq!(req.title, "Buy milk");
        assert_eq!(req.sensitive_text, "");
    }

    #[test]
    fn update_request_treats_null_as_absent() {
        let req: UpdateRecordRequest =
            serde_json::from_value(json!({"completed": true, "title": null})).unwrap();
        assert_eq!(req.completed, Some(true));
        assert!(req.title.is_none());
        assert!(req.sensitive_text.is_none());
    }

    #[test]
    fn update_request_skips_absent_fields_when_serialised() {
        let req = UpdateRecordRequest {
            completed: Some(false),
            ..UpdateRecordRequest::default()
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"completed": false}));
    }

    #[test]
    fn error_response_from_service_error() {
        let e = ErrorResponse::from(&ServiceError::NotFound);
        assert_eq!(e.code, "not_found");
        assert_eq!(e.message, "record not found");
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            db_ready: true,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert!(decoded.db_ready);
    }
}
