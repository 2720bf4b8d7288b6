//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. An entity
/// returning one of these has not mutated any state for the failing call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Supplied data violates a field-level rule (sign, required text,
    /// range, length cap).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The entity's current lifecycle state does not allow the operation
    /// (already recognized, already refunded, over-retirement, ...).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = DomainError::validation("amount must be positive");
        assert_eq!(err.to_string(), "validation failed: amount must be positive");

        let err = DomainError::invalid_operation("deposit already refunded");
        assert_eq!(err.to_string(), "invalid operation: deposit already refunded");
        assert!(err.is_invalid_operation());
        assert!(!err.is_validation());
    }
}
