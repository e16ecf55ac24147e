//! Error types for sqlwhere

use thiserror::Error;

/// Result type alias for sqlwhere operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised while ingesting a condition tree or parsing identifiers.
///
/// Compiling an already-built tree never fails; partially empty input is
/// dropped silently instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A logical node carried a tag outside the operator vocabulary
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Identifier failed validation
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl FilterError {
    /// Create an unsupported operator error
    pub fn unsupported_operator(tag: impl Into<String>) -> Self {
        Self::UnsupportedOperator(tag.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    /// Check if this is an unsupported operator error
    pub fn is_unsupported_operator(&self) -> bool {
        matches!(self, Self::UnsupportedOperator(_))
    }

    /// The offending tag, if this is an unsupported operator error
    pub fn operator_tag(&self) -> Option<&str> {
        match self {
            Self::UnsupportedOperator(tag) => Some(tag),
            _ => None,
        }
    }
}
