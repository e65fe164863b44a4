//! FILENAME: table/src/error.rs

use thiserror::Error;
use crate::value::ScalarType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("type mismatch: expected a {expected} value, got {actual}")]
    TypeMismatch {
        expected: ScalarType,
        actual: ScalarType,
    },

    #[error("unknown column: {0}")]
    UnknownColumn(String),
}
