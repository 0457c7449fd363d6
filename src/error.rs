//! Error types for identity collections, heaps and selection.

use thiserror::Error;

/// Errors raised by identity, collection, heap and selection operations.
///
/// All variants are precondition violations: they are detected at the call
/// boundary and never leave a partially modified result behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Offset outside the valid range, or access into an empty collection.
    #[error("offset {offset} out of range for length {len}")]
    OutOfRange { offset: usize, len: usize },

    /// Operation not supported by this collection or identity scheme.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// Invalid parameter value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unset variable, or cursor positioned outside its collection.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl IdError {
    pub(crate) fn out_of_range(offset: usize, len: usize) -> Self {
        Self::OutOfRange { offset, len }
    }
}

/// Result type for identity operations.
pub type Result<T> = std::result::Result<T, IdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = IdError::out_of_range(7, 3);
        assert_eq!(err.to_string(), "offset 7 out of range for length 3");

        let err = IdError::InvalidArgument("k must be positive".into());
        assert!(err.to_string().contains("k must be positive"));
    }
}
