//! Data type definitions for row set columns.

use serde::{Deserialize, Serialize};

/// Supported column data types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// Exact fixed-point decimal
    Decimal,
    /// UTF-8 string
    String,
    /// Binary data
    Bytes,
    /// Date and time stored as Unix timestamp (milliseconds)
    DateTime,
}

impl DataType {
    /// Returns whether this type is nullable by default.
    pub fn is_nullable_by_default(&self) -> bool {
        matches!(self, DataType::Bytes)
    }

    /// Returns whether values of this type can be compared for join matching.
    pub fn is_matchable(&self) -> bool {
        !matches!(self, DataType::Bytes)
    }

    /// Returns whether this is a numeric type.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int32 | DataType::Int64 | DataType::Float64 | DataType::Decimal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_equality() {
        assert_eq!(DataType::Int32, DataType::Int32);
        assert_ne!(DataType::Int32, DataType::Int64);
    }

    #[test]
    fn test_nullable_by_default() {
        assert!(!DataType::Boolean.is_nullable_by_default());
        assert!(!DataType::Decimal.is_nullable_by_default());
        assert!(DataType::Bytes.is_nullable_by_default());
    }

    #[test]
    fn test_numeric() {
        assert!(DataType::Decimal.is_numeric());
        assert!(DataType::Float64.is_numeric());
        assert!(!DataType::String.is_numeric());
        assert!(!DataType::DateTime.is_numeric());
    }
}
