use picrate_domain::DomainError;
use thiserror::Error;

/// Failure taxonomy surfaced to callers. No variant is retried and none is
/// fatal to the process; each request fails on its own.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("corrupt task data: {0}")]
    CorruptData(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("persistence error: {0}")]
    Persistence(String),
}
