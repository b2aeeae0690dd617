//! Error types for row set operations.

use crate::types::DataType;
use thiserror::Error;

/// Result type alias for row set operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for row set operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The operation needs a real row but the cursor is elsewhere, or vice versa.
    #[error("invalid cursor state: {message}")]
    InvalidCursorState { message: String },

    /// Column index outside `[1, count]`.
    #[error("invalid column index {index} (row set has {count} columns)")]
    InvalidColumnIndex { index: usize, count: usize },

    /// Unknown column name.
    #[error("column not found: {name}")]
    ColumnNotFound { name: String },

    /// The capability is categorically not provided.
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// The feature exists in the contract but is not implemented here.
    #[error("feature not supported: {feature}")]
    FeatureNotSupported { feature: String },

    /// A value could not be converted to the requested type.
    #[error("cannot convert {value} to {target:?}")]
    Conversion { value: String, target: DataType },

    /// The operation is not legal in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    /// The backing source rejected a change.
    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Hard failure reported by the backing source.
    #[error("source error: {message}")]
    Source { message: String },

    /// The serialized document could not be read or written.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Creates an invalid cursor state error.
    pub fn invalid_cursor(message: impl Into<String>) -> Self {
        Error::InvalidCursorState {
            message: message.into(),
        }
    }

    /// Creates an invalid column index error.
    pub fn invalid_column(index: usize, count: usize) -> Self {
        Error::InvalidColumnIndex { index, count }
    }

    /// Creates a column not found error.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Error::ColumnNotFound { name: name.into() }
    }

    /// Creates an unsupported capability error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Error::Unsupported {
            operation: operation.into(),
        }
    }

    /// Creates a feature-not-supported error.
    pub fn feature_not_supported(feature: impl Into<String>) -> Self {
        Error::FeatureNotSupported {
            feature: feature.into(),
        }
    }

    /// Creates a conversion error.
    pub fn conversion(value: impl Into<String>, target: DataType) -> Self {
        Error::Conversion {
            value: value.into(),
            target,
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a constraint violation error.
    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Error::ConstraintViolation {
            message: message.into(),
        }
    }

    /// Creates a backing source error.
    pub fn source(message: impl Into<String>) -> Self {
        Error::Source {
            message: message.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Error::Serialization {
            message: message.into(),
        }
    }

    /// Returns true for errors raised because of the cursor position.
    pub fn is_invalid_cursor(&self) -> bool {
        matches!(self, Error::InvalidCursorState { .. })
    }

    /// Returns true for unsupported-capability errors.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported { .. })
    }
}
