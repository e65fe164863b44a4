//! FILENAME: reshape-engine/src/error.rs

use thiserror::Error;
use table::{ScalarType, SelectError, TableError};
use crate::validate::SpecError;

/// Everything the reshape subsystem can fail with. Each variant carries
/// the identifiers needed to diagnose the failure without re-deriving
/// engine state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReshapeError {
    #[error("invalid column selection: {0}")]
    InvalidSelection(#[from] SelectError),

    #[error("invalid specification: {0}")]
    Spec(#[from] SpecError),

    #[error(
        "cannot infer reshape direction: wide columns {present:?} exist in the source \
         but {absent:?} do not"
    )]
    AmbiguousDirection {
        present: Vec<String>,
        absent: Vec<String>,
    },

    #[error(
        "value variable '{value}' mixes {first_type} (from column '{first_column}') \
         with {second_type} (from column '{second_column}')"
    )]
    TypeConflict {
        value: String,
        first_column: String,
        first_type: ScalarType,
        second_column: String,
        second_type: ScalarType,
    },

    #[error(
        "duplicate key: source rows {first_row} and {second_row} both feed wide \
         column '{name}' within one output group"
    )]
    DuplicateKey {
        name: String,
        first_row: usize,
        second_row: usize,
    },

    #[error("specification references columns missing from the source: {columns:?}")]
    UnknownColumn { columns: Vec<String> },

    #[error(transparent)]
    Table(#[from] TableError),
}
