//! HTTP surface for BatchLedger.
//!
//! # Responsibility
//! - Route batch lifecycle and report requests to core services.
//! - Map service outcomes to fixed, non-leaking HTTP responses.

use axum::middleware::from_fn;
use axum::Router;

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::{AppState, StoreCallError};

/// Builds the full router over an injected store handle.
pub fn construct_router(state: AppState) -> Router {
    Router::new()
        .nest("/batches", routes::batch::routes())
        .nest("/health", routes::health::routes())
        .with_state(state)
        .layer(from_fn(middleware::log_requests))
}
