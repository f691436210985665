//! Axum request handlers for all service endpoints.
//!
//! Handlers clean input, resolve the owner, and run the blocking record store
//! on the blocking thread pool. They never log request bodies.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{
        CreateRecordRequest, ErrorResponse, HealthResponse, ListRecordsQuery, ListRecordsResponse,
        RecordResponse, UpdateRecordRequest,
    },
    ServiceError,
};
use tracing::error;
use uuid::Uuid;

use super::{
    error::ApiError,
    owner::Owner,
    sanitize::{clean_sensitive_text, clean_title},
    state::AppState,
};
use crate::store::{Page, Record, RecordId, RecordPatch, SqliteRecordStore, StoreResult};

type ApiResult<T> = Result<T, ApiError>;

/// `POST /records`: create a record owned by the caller.
pub async fn create_record(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    payload: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let Json(req) = payload.map_err(json_rejection)?;
    let title = clean_title(&req.title);
    let sensitive_text = clean_sensitive_text(&req.sensitive_text);

    let record = run_store(&state, move |store| {
        store.create(&owner_id, &title, &sensitive_text)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// `GET /records`: the caller's records, newest first.
pub async fn list_records(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    query: Result<Query<ListRecordsQuery>, QueryRejection>,
) -> ApiResult<Json<ListRecordsResponse>> {
    let Query(query) = query.map_err(|_| {
        ServiceError::BadRequest("limit and offset must be integers".into())
    })?;
    let page = Page::new(query.limit, query.offset)?;

    let records = run_store(&state, move |store| store.list(&owner_id, page)).await?;
    Ok(Json(ListRecordsResponse {
        items: records.into_iter().map(Into::into).collect(),
        limit: page.limit(),
        offset: page.offset(),
    }))
}

/// `GET /records/{id}`
pub async fn get_record(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(id): Path<String>,
) -> ApiResult<Json<RecordResponse>> {
    let id = parse_record_id(&id)?;
    let record = run_store(&state, move |store| store.get(&owner_id, id)).await?;
    Ok(Json(record.into()))
}

/// `PATCH /records/{id}`: partial update; absent fields are left untouched.
pub async fn update_record(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRecordRequest>, JsonRejection>,
) -> ApiResult<Json<RecordResponse>> {
    let id = parse_record_id(&id)?;
    let Json(req) = payload.map_err(json_rejection)?;
    let patch = RecordPatch {
        title: req.title.as_deref().map(clean_title),
        sensitive_text: req.sensitive_text.as_deref().map(clean_sensitive_text),
        completed: req.completed,
    };

    let record = run_store(&state, move |store| store.update(&owner_id, id, patch)).await?;
    Ok(Json(record.into()))
}

/// `DELETE /records/{id}`
pub async fn delete_record(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_record_id(&id)?;
    run_store(&state, move |store| store.delete(&owner_id, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /health`: liveness and readiness check.
///
/// Returns `200 OK` when the database answers a probe, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let db_ready = run_store(&state, |store| store.ping()).await.is_ok();

    let (status_code, status_str) = if db_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        db_ready,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            sensitive_text: record.sensitive_text,
            completed: record.completed,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run a store operation on the blocking pool; rusqlite calls block.
async fn run_store<T, F>(state: &AppState, op: F) -> ApiResult<T>
where
    F: FnOnce(&SqliteRecordStore) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    let result = tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| {
            error!(error = %e, "store task failed");
            ServiceError::Internal("store task failed".into())
        })?;
    Ok(result?)
}

/// An id that is not a UUID cannot name a visible record.
fn parse_record_id(raw: &str) -> Result<RecordId, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound)
}

/// Serde messages can quote the rejected input, so they are not echoed back.
fn json_rejection(rejection: JsonRejection) -> ServiceError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge("request body exceeds the size limit".into())
    } else {
        ServiceError::BadRequest("request body is not valid JSON for this endpoint".into())
    }
}
