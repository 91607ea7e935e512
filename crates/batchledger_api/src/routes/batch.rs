//! Batch lifecycle and closed-batch report handlers.
//!
//! Request and response bodies use camelCase keys; reports keep the
//! snake_case shape produced by the core crate.

use crate::error::{service_error, ApiError};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use batchledger_core::{BatchId, BatchReport, ServiceError, StorageKind};
use serde::{Deserialize, Serialize};

pub const BATCH_NAME_REQUIRED: &str = "Batch name is required";
pub const BATCH_TABLE_MISSING: &str = "Batch table does not exist";
pub const INVALID_COLUMN: &str = "Invalid column name";
pub const CREATE_FAILED: &str = "Unable to create batch";
pub const INVALID_BATCH_ID: &str = "A numeric batchId is required";
pub const CLOSE_FAILED: &str = "Unable to close batch";
pub const BATCH_CLOSED: &str = "Batch closed";
pub const NO_ACTIVE_BATCH: &str = "No active batch found";
pub const ACTIVE_LOOKUP_FAILED: &str = "Unable to fetch the last active batch";
pub const REPORT_FAILED: &str = "Unable to fetch inactive batches";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_batch))
        .route("/close", post(close_batch))
        .route("/active", get(last_active_batch))
        .route("/inactive", get(inactive_batches))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    #[serde(default)]
    pub batch_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchResponse {
    pub batch_id: BatchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseBatchRequest {
    pub batch_id: BatchId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBatchResponse {
    pub batch_id: BatchId,
    pub batch_name: String,
}

/// `POST /batches`
///
/// An unreadable body is treated the same as a missing name.
pub async fn create_batch(
    State(state): State<AppState>,
    payload: Result<Json<CreateBatchRequest>, JsonRejection>,
) -> Result<Json<CreateBatchResponse>, ApiError> {
    let batch_name = payload
        .ok()
        .and_then(|Json(request)| request.batch_name)
        .unwrap_or_default();
    if batch_name.trim().is_empty() {
        return Err(ApiError::bad_request(BATCH_NAME_REQUIRED));
    }

    let batch_id = state
        .run(move |service| service.create_batch(&batch_name))
        .await
        .map_err(|err| {
            let message = match service_error(&err) {
                Some(ServiceError::Validation(_)) => {
                    return ApiError::bad_request(BATCH_NAME_REQUIRED);
                }
                Some(error) => match error.storage_kind() {
                    Some(StorageKind::MissingTable) => BATCH_TABLE_MISSING,
                    Some(StorageKind::MissingColumn) => INVALID_COLUMN,
                    _ => CREATE_FAILED,
                },
                None => CREATE_FAILED,
            };
            ApiError::from_store(message, err)
        })?;

    Ok(Json(CreateBatchResponse { batch_id }))
}

/// `POST /batches/close`
///
/// Closing an unknown or already closed batch still answers `Batch closed`.
pub async fn close_batch(
    State(state): State<AppState>,
    payload: Result<Json<CloseBatchRequest>, JsonRejection>,
) -> Result<&'static str, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request(INVALID_BATCH_ID))?;
    let batch_id = request.batch_id;

    state
        .run(move |service| service.close_batch(batch_id))
        .await
        .map_err(|err| ApiError::from_store(CLOSE_FAILED, err))?;

    Ok(BATCH_CLOSED)
}

/// `GET /batches/active`
pub async fn last_active_batch(
    State(state): State<AppState>,
) -> Result<Json<ActiveBatchResponse>, ApiError> {
    let batch = state
        .run(|service| service.last_active_batch())
        .await
        .map_err(|err| match service_error(&err) {
            Some(ServiceError::NotFound(_)) => ApiError::not_found(NO_ACTIVE_BATCH),
            _ => ApiError::from_store(ACTIVE_LOOKUP_FAILED, err),
        })?;

    Ok(Json(ActiveBatchResponse {
        batch_id: batch.batch_id,
        batch_name: batch.batch_name,
    }))
}

/// `GET /batches/inactive`
///
/// Answers an empty array when no batch has been closed yet.
pub async fn inactive_batches(
    State(state): State<AppState>,
) -> Result<Json<Vec<BatchReport>>, ApiError> {
    let reports = state
        .run(|service| service.inactive_batch_reports())
        .await
        .map_err(|err| ApiError::from_store(REPORT_FAILED, err))?;

    Ok(Json(reports))
}
