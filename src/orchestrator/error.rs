//! Typed outcomes of orchestrator operations

use serde::Serialize;
use thiserror::Error;

/// Status tag carried by every operation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    Ok,
    NotFound,
    Conflict,
    RemoteFailure,
    Internal,
}

/// Failure of an orchestrator operation.
///
/// Store and catalog errors are converted into one of these at the
/// orchestrator boundary; nothing else escapes to the response layer.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Referenced profile, relationship, or catalog entry is absent
    #[error("{0}")]
    NotFound(String),

    /// The operation's state precondition does not hold
    #[error("{0}")]
    Conflict(String),

    /// The catalog was unreachable or rejected the call
    #[error("{0}")]
    RemoteFailure(String),

    /// Unexpected graph store failure
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl OrchestratorError {
    pub fn status(&self) -> QueryStatus {
        match self {
            OrchestratorError::NotFound(_) => QueryStatus::NotFound,
            OrchestratorError::Conflict(_) => QueryStatus::Conflict,
            OrchestratorError::RemoteFailure(_) => QueryStatus::RemoteFailure,
            OrchestratorError::Internal(_) => QueryStatus::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
