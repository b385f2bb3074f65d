//! Error types for the Conclave core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the orchestration core.
///
/// Public operations surface `InvalidInput`, `NotFound` and `InvalidState`
/// synchronously; `TransientBackend` and `Internal` are turn-scope failures
/// that the dispatch loop absorbs (see the orchestrator for how each is
/// degraded rather than propagated).
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ConclaveError {
    /// A precondition on a public operation was violated.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The referenced session does not resolve.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not allowed in the session's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A repository or LLM transport failure inside a turn.
    #[error("Transient backend error: {0}")]
    TransientBackend(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, ConclaveError>`.
pub type Result<T> = std::result::Result<T, ConclaveError>;
