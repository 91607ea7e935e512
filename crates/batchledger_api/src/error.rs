use crate::state::StoreCallError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use batchledger_core::ServiceError;
use log::{error, warn};
use serde::Serialize;
use std::fmt::Display;

/// Error answered to HTTP callers.
///
/// Only `code` and a fixed `message` reach the client; the underlying cause
/// is logged when the error is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

impl ApiError {
    pub fn bad_request(message: &'static str) -> Self {
        warn!("event=http_error module=api status=400 message={message}");
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message,
        }
    }

    pub fn not_found(message: &'static str) -> Self {
        warn!("event=http_error module=api status=404 message={message}");
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message,
        }
    }

    pub fn internal(message: &'static str, cause: impl Display) -> Self {
        error!("event=http_error module=api status=500 message={message} error={cause}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message,
        }
    }

    /// Maps any store call failure onto one fixed 500 message.
    pub fn from_store(message: &'static str, err: StoreCallError) -> Self {
        Self::internal(message, err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: &'static str,
        }

        (
            self.status,
            Json(ErrorBody {
                code: self.code,
                message: self.message,
            }),
        )
            .into_response()
    }
}

/// Returns the service error inside a store call failure, if any.
pub(crate) fn service_error(err: &StoreCallError) -> Option<&ServiceError> {
    match err {
        StoreCallError::Service(inner) => Some(inner),
        StoreCallError::Worker(_) => None,
    }
}
