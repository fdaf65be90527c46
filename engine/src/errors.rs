use thiserror::Error;

use crate::storage::StorageError;
use sentry_api::ApiError;

/// Result type alias for engine operations.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Errors that can occur while handling an engine operation.
///
/// Every variant renders a human-readable message with enough resource
/// context to diagnose the failure from the response alone. Nothing is
/// retried and nothing is swallowed.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No configuration record exists yet.
    #[error("backend is not configured")]
    NotConfigured,

    /// A required request field is missing or empty. Rejected before any I/O.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The named project has no stored record.
    #[error("project {0} is not configured")]
    ProjectNotFound(String),

    /// DSN resolution was asked to use the project's default label, but none
    /// is set.
    #[error("no default DSN label is set for project {0}")]
    NoDefaultLabel(String),

    #[error("no route matched for path {0:?}")]
    NoRoute(String),

    #[error("operation {verb} is not supported on path {path:?}")]
    UnsupportedOperation { verb: routing::Verb, path: String },

    /// A remote call failed for a reason other than "resource not found".
    #[error("{context}: {source}")]
    Remote {
        context: &'static str,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to serialize response: {0}")]
    ResponseSerialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Wraps a remote API failure with the operation it interrupted.
    pub fn remote(context: &'static str, source: ApiError) -> Self {
        EngineError::Remote { context, source }
    }
}
