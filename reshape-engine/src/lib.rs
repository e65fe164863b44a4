//! FILENAME: reshape-engine/src/lib.rs
//! Spec-driven table reshaping for Reframe.
//!
//! This crate converts tables between wide layouts (information encoded
//! partly in column names) and long layouts (information encoded
//! entirely as cell data). The correspondence between the two is itself
//! an ordinary table - the specification - so callers can build one
//! with the helpers here, or edit it like any other table, before
//! handing it to the engine. It depends on `table` only for the shared
//! columnar value.
//!
//! Layers:
//! - `spec`: Builders that derive a specification table (what the reshape IS)
//! - `validate`: Consistency checks producing an opaque ValidatedSpec
//! - `intern`: Normalized hashable scalars, value interning, group keys
//! - `engine`: The pivot executors (HOW we reshape)

pub mod spec;
pub mod validate;
pub mod intern;
pub mod engine;
pub mod error;

pub use spec::{build_long_spec, build_wide_spec, NAME_COLUMN, VALUE_COLUMN};
pub use validate::{validate, SpecError, ValidatedSpec};
pub use intern::{GroupKey, KeyValue, OrderedFloat, ValueId, ValueInterner, VALUE_ID_MISSING};
pub use engine::{infer_direction, pivot, pivot_spec, Direction};
pub use error::ReshapeError;
