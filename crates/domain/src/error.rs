//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or normalization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value could not be represented as a scalar option.
    #[error("non-scalar value: {0}")]
    NonScalarValue(String),

    /// A variable definition is structurally invalid.
    #[error("invalid variable: {0}")]
    InvalidVariable(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
