//! FILENAME: table/src/value.rs
//! PURPOSE: Defines the scalar cell value and its type tag.
//! CONTEXT: A `ScalarValue` is the unit of data exchanged between a
//! `Column` and its callers. It separates the missing marker from the
//! four concrete element types so a column stays homogeneously typed
//! while any individual cell may be absent.

use std::cmp::Ordering;
use std::fmt;
use serde::{Deserialize, Serialize};

/// The element type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Number,
    Integer,
    Text,
    Boolean,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScalarType::Number => "number",
            ScalarType::Integer => "integer",
            ScalarType::Text => "text",
            ScalarType::Boolean => "boolean",
        };
        write!(f, "{}", label)
    }
}

/// A single cell value. `Missing` is the one missing marker shared by
/// every column type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Missing,
    Number(f64),
    Integer(i64),
    Text(String),
    Boolean(bool),
}

impl ScalarValue {
    /// Returns the type tag, or `None` for the missing marker.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            ScalarValue::Missing => None,
            ScalarValue::Number(_) => Some(ScalarType::Number),
            ScalarValue::Integer(_) => Some(ScalarType::Integer),
            ScalarValue::Text(_) => Some(ScalarType::Text),
            ScalarValue::Boolean(_) => Some(ScalarType::Boolean),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ScalarValue::Missing)
    }

    /// Returns the display form of the value as a String.
    /// Used by the wide spec builder to generate wide-column names.
    pub fn display(&self) -> String {
        match self {
            ScalarValue::Missing => String::new(),
            ScalarValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            ScalarValue::Integer(i) => format!("{}", i),
            ScalarValue::Text(s) => s.clone(),
            ScalarValue::Boolean(b) => {
                if *b { "true" } else { "false" }.to_string()
            }
        }
    }

    /// Total ordering across all scalar values, used for deterministic
    /// diagnostics: missing < numeric < text < boolean. Numbers and
    /// integers compare numerically with each other; NaN ties equal.
    pub fn total_cmp(&self, other: &ScalarValue) -> Ordering {
        use ScalarValue::*;
        match (self, other) {
            (Missing, Missing) => Ordering::Equal,
            (Missing, _) => Ordering::Less,
            (_, Missing) => Ordering::Greater,

            (Number(a), Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Number(a), Integer(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
            (Integer(a), Number(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
            (Number(_) | Integer(_), _) => Ordering::Less,
            (_, Number(_) | Integer(_)) => Ordering::Greater,

            (Text(a), Text(b)) => a.cmp(b),
            (Text(_), _) => Ordering::Less,
            (_, Text(_)) => Ordering::Greater,

            (Boolean(a), Boolean(b)) => a.cmp(b),
        }
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Number(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Integer(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Text(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}
