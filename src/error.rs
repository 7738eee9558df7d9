//! Error types for the coordinator store
//!
//! Provides unified error handling using thiserror.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::ErrorResponse;

// == Entity Kind ==
/// The record kinds owned by the repositories, used to label errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Scenario,
    TestRun,
    ChaosEvent,
    TestResult,
    Service,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Scenario => "Scenario",
            EntityKind::TestRun => "TestRun",
            EntityKind::ChaosEvent => "ChaosEvent",
            EntityKind::TestResult => "TestResult",
            EntityKind::Service => "Service",
        };
        f.write_str(name)
    }
}

// == Adapter Error Enum ==
/// Unified error type for repositories, the cache and the factory.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    /// Write or transition against an id that is not stored
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    /// Numeric operation on a non-integer cache value
    #[error("Value for key {0} is not an integer")]
    TypeMismatch(String),

    /// Numeric operation would leave the i64 range
    #[error("Numeric overflow on key {0}")]
    Overflow(String),

    /// Enumerated field outside its allowed set
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Status helper asked to move a record backwards
    #[error("{kind} {id} cannot move from {from} to {to}")]
    InvalidTransition {
        kind: EntityKind,
        id: String,
        from: String,
        to: String,
    },

    /// Stored payload could not be parsed as structured data
    #[error("Decode error: {0}")]
    Decode(String),

    /// External resource lifecycle failure
    #[error("Resource {resource} failed: {message}")]
    Resource { resource: String, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdapterError {
    /// Shorthand for a not-found error on `kind`.
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        AdapterError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Shorthand for a resource error.
    pub fn resource(resource: impl Into<String>, message: impl Into<String>) -> Self {
        AdapterError::Resource {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdapterError::NotFound { .. } => StatusCode::NOT_FOUND,
            AdapterError::TypeMismatch(_)
            | AdapterError::Overflow(_)
            | AdapterError::Validation(_)
            | AdapterError::Decode(_) => StatusCode::BAD_REQUEST,
            AdapterError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AdapterError::Resource { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AdapterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the coordinator store.
pub type Result<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AdapterError::not_found(EntityKind::TestRun, "run-001");
        assert_eq!(err.to_string(), "TestRun run-001 not found");
    }

    #[test]
    fn test_error_status_codes() {
        let resp = AdapterError::not_found(EntityKind::Scenario, "s1").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AdapterError::resource("postgres", "refused").into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = AdapterError::TypeMismatch("k".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
