//! Error types for Lova Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A weighted column does not exist in the dataset
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A record is missing a field that the dataset declares
    #[error("Field not found: {field} (record {row})")]
    FieldNotFound { field: String, row: usize },

    /// Percentile outside (0, 1]
    #[error("Invalid percentile: {0} (expected a value in (0, 1])")]
    InvalidPercentile(f64),

    /// Column has no rows to normalize
    #[error("Empty column: {0}")]
    EmptyColumn(String),

    /// Post-cap maximum equals post-cap minimum
    #[error("Degenerate column '{column}': all values equal {value} after capping")]
    DegenerateColumn { column: String, value: f64 },

    /// Boolean decode width is not usable
    #[error("Invalid label width: {0} (at most 64 bits are supported)")]
    InvalidWidth(usize),

    /// Boolean weight vector width differs from the prepared decode width
    #[error("Boolean width mismatch: expected {expected}, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    /// Vectors that must line up have different lengths
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A value cannot be used (NaN, infinite, wrong shape)
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_column_message() {
        let err = CoreError::DegenerateColumn {
            column: "watch_time".to_string(),
            value: 3.0,
        };
        assert!(err.to_string().contains("watch_time"));
        assert!(err.to_string().contains("after capping"));
    }

    #[test]
    fn test_width_mismatch_message() {
        let err = CoreError::WidthMismatch {
            expected: 4,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Boolean width mismatch: expected 4, got 3");
    }
}
