//! FILENAME: table/src/selector.rs
//! PURPOSE: Resolves a column-selection expression against a table.
//! CONTEXT: Selectors are how callers say "these columns" without
//! spelling every name: an explicit list, a positional range between
//! two named columns, a name pattern, or an arbitrary predicate.

use std::fmt;
use thiserror::Error;
use crate::table::Table;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectError {
    #[error("unknown column in selection: {0}")]
    UnknownColumn(String),

    #[error("selection matched no columns")]
    EmptySelection,

    #[error("range start '{start}' appears after end '{end}'")]
    BadRange { start: String, end: String },
}

/// A column-selection expression.
pub enum ColumnSelector {
    /// Exactly these names, in this order.
    Names(Vec<String>),
    /// Every column from `start` to `end` inclusive, by table position.
    Range { start: String, end: String },
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    /// Arbitrary predicate over the column name.
    Predicate(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

impl ColumnSelector {
    pub fn names<N, I>(names: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = N>,
    {
        ColumnSelector::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        ColumnSelector::Range {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        ColumnSelector::Predicate(Box::new(f))
    }

    /// Resolves the selection to a concrete ordered list of column
    /// names. Explicit name lists keep their own order; every other
    /// form yields table order.
    pub fn resolve(&self, table: &Table) -> Result<Vec<String>, SelectError> {
        let selected = match self {
            ColumnSelector::Names(names) => {
                for name in names {
                    if !table.has_column(name) {
                        return Err(SelectError::UnknownColumn(name.clone()));
                    }
                }
                names.clone()
            }
            ColumnSelector::Range { start, end } => {
                let start_pos = table
                    .column_index(start)
                    .ok_or_else(|| SelectError::UnknownColumn(start.clone()))?;
                let end_pos = table
                    .column_index(end)
                    .ok_or_else(|| SelectError::UnknownColumn(end.clone()))?;
                if start_pos > end_pos {
                    return Err(SelectError::BadRange {
                        start: start.clone(),
                        end: end.clone(),
                    });
                }
                table.names()[start_pos..=end_pos].to_vec()
            }
            ColumnSelector::StartsWith(prefix) => Self::matching(table, |n| n.starts_with(prefix.as_str())),
            ColumnSelector::EndsWith(suffix) => Self::matching(table, |n| n.ends_with(suffix.as_str())),
            ColumnSelector::Contains(fragment) => Self::matching(table, |n| n.contains(fragment.as_str())),
            ColumnSelector::Predicate(f) => Self::matching(table, |n| f(n)),
        };

        if selected.is_empty() {
            return Err(SelectError::EmptySelection);
        }
        Ok(selected)
    }

    fn matching(table: &Table, keep: impl Fn(&str) -> bool) -> Vec<String> {
        table
            .names()
            .iter()
            .filter(|n| keep(n.as_str()))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::Names(names) => f.debug_tuple("Names").field(names).finish(),
            ColumnSelector::Range { start, end } => f
                .debug_struct("Range")
                .field("start", start)
                .field("end", end)
                .finish(),
            ColumnSelector::StartsWith(p) => f.debug_tuple("StartsWith").field(p).finish(),
            ColumnSelector::EndsWith(s) => f.debug_tuple("EndsWith").field(s).finish(),
            ColumnSelector::Contains(c) => f.debug_tuple("Contains").field(c).finish(),
            ColumnSelector::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
