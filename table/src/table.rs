//! FILENAME: table/src/table.rs
//! PURPOSE: The columnar table container.
//! CONTEXT: A `Table` is an ordered set of named columns of equal
//! length. Rows have no identity beyond position. Column lookup is a
//! linear scan by name; tables in this workspace have tens of columns,
//! not thousands.

use serde::{Deserialize, Serialize};
use crate::column::Column;
use crate::error::TableError;
use crate::value::ScalarValue;

/// An ordered collection of named, typed columns sharing one row count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    /// Creates an empty table (no columns, no rows).
    pub fn new() -> Self {
        Table {
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Builds a table from (name, column) pairs, checking name
    /// uniqueness and equal column lengths.
    pub fn from_columns<N, I>(columns: I) -> Result<Self, TableError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Column)>,
    {
        let mut table = Table::new();
        for (name, column) in columns {
            table.push_column(name, column)?;
        }
        Ok(table)
    }

    /// Appends a column. The first column fixes the table's row count.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.names.iter().any(|n| *n == name) {
            return Err(TableError::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.row_count(),
                actual: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|n| n.as_str())
    }

    /// Returns the cell at (column index, row). Out-of-range reads are
    /// missing, matching `Column::value`.
    pub fn value_at(&self, column: usize, row: usize) -> ScalarValue {
        self.columns
            .get(column)
            .map_or(ScalarValue::Missing, |c| c.value(row))
    }

    /// Iterates (name, column) pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names
            .iter()
            .map(|n| n.as_str())
            .zip(self.columns.iter())
    }

    /// Returns a copy keeping only rows where `mask` is true.
    pub fn filtered(&self, mask: &[bool]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.filtered(mask)).collect(),
        }
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}
