//! Shared error taxonomy for the lifecycle workflows.
//!
//! Every workflow operation surfaces one of six caller-facing categories; the
//! message inside each variant is already suitable for rendering to an end
//! user. Storage faults travel separately as [`RepositoryError`] so routers
//! can distinguish "you asked for something impossible" from "the store let
//! us down".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failure categories surfaced synchronously by workflow operations.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Malformed input: bad date, bad id format, out-of-range value.
    #[error("{0}")]
    Validation(String),
    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),
    /// A duplicate of a singleton entity already exists.
    #[error("{0}")]
    Conflict(String),
    /// The operation is invalid for the entity's current lifecycle state.
    #[error("{0}")]
    State(String),
    /// The requisition has no remaining openings.
    #[error("{0}")]
    Capacity(String),
    /// The actor lacks the role or ownership required for the action.
    #[error("{0}")]
    Forbidden(String),
    /// The storage layer failed or detected a concurrent write.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LifecycleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    pub fn capacity(message: impl Into<String>) -> Self {
        Self::Capacity(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            LifecycleError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
            LifecycleError::Conflict(_) | LifecycleError::Capacity(_) => StatusCode::CONFLICT,
            LifecycleError::State(_) => StatusCode::CONFLICT,
            LifecycleError::Forbidden(_) => StatusCode::FORBIDDEN,
            LifecycleError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            LifecycleError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            LifecycleError::Repository(RepositoryError::VersionConflict) => StatusCode::CONFLICT,
            LifecycleError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for LifecycleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A record with the same uniqueness key already exists.
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    /// The record changed since it was read; the write was not applied.
    #[error("record was modified concurrently")]
    VersionConflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
