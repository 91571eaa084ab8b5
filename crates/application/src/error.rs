//! Application error types

use dashvar_domain::DomainError;
use thiserror::Error;

use crate::ports::QueryError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The requested variable does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An option query failed.
    #[error("query error: {0}")]
    Query(#[from] QueryError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
