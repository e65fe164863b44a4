//! Value interning and group keys - the grouping machinery.
//!
//! Grouping rows and matching key tuples both need scalar cells as hash
//! keys. Rather than hashing full scalars per row per column, each
//! column gets a `ValueInterner`: every unique value is stored once and
//! referenced by a dense `u32` id, and a group key is the tuple of ids
//! across the grouping columns. Two rows share a group exactly when
//! their id tuples are equal, and id tuples are cheap to hash and
//! compare.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use table::ScalarValue;

/// A reference to an interned value within one column's interner.
pub type ValueId = u32;

/// Represents a missing cell in any interner.
pub const VALUE_ID_MISSING: ValueId = u32::MAX;

/// A tuple of interned value ids identifying one group. Key tuples are
/// almost always short, so spill to the heap only past four columns.
pub type GroupKey = SmallVec<[ValueId; 4]>;

/// A normalized, hashable representation of a cell value.
/// Used as keys in the unique value store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyValue {
    Missing,
    Number(OrderedFloat),
    Integer(i64),
    Text(String),
    Boolean(bool),
}

impl From<&ScalarValue> for KeyValue {
    fn from(value: &ScalarValue) -> Self {
        match value {
            ScalarValue::Missing => KeyValue::Missing,
            ScalarValue::Number(n) => KeyValue::Number(OrderedFloat::new(*n)),
            ScalarValue::Integer(i) => KeyValue::Integer(*i),
            ScalarValue::Text(s) => KeyValue::Text(s.clone()),
            ScalarValue::Boolean(b) => KeyValue::Boolean(*b),
        }
    }
}

/// Wrapper around f64 that implements Eq and Hash for use as HashMap
/// keys. NaN values are treated as equal to each other, and -0.0 is
/// normalized to 0.0 so equality and hashing agree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(f64);

impl OrderedFloat {
    pub fn new(value: f64) -> Self {
        // 0.0 == -0.0 but the bit patterns differ; keep one of them
        if value == 0.0 {
            OrderedFloat(0.0)
        } else {
            OrderedFloat(value)
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

/// Unique value store for a single column.
/// Interns values and provides O(1) lookup by ValueId.
#[derive(Debug, Clone, Default)]
pub struct ValueInterner {
    /// Map from value to its unique ID (for deduplication during build).
    value_to_id: FxHashMap<KeyValue, ValueId>,

    /// Ordered list of unique values (indexed by ValueId).
    id_to_value: Vec<KeyValue>,
}

impl ValueInterner {
    pub fn new() -> Self {
        ValueInterner::default()
    }

    /// Interns a value and returns its ValueId.
    /// If the value already exists, returns the existing ID.
    pub fn intern(&mut self, value: KeyValue) -> ValueId {
        if let KeyValue::Missing = value {
            return VALUE_ID_MISSING;
        }

        if let Some(&id) = self.value_to_id.get(&value) {
            return id;
        }

        let id = self.id_to_value.len() as ValueId;
        self.id_to_value.push(value.clone());
        self.value_to_id.insert(value, id);
        id
    }

    /// Interns a scalar cell directly.
    pub fn intern_scalar(&mut self, value: &ScalarValue) -> ValueId {
        self.intern(KeyValue::from(value))
    }

    /// Gets the value for a given ID.
    pub fn get(&self, id: ValueId) -> Option<&KeyValue> {
        if id == VALUE_ID_MISSING {
            return Some(&KeyValue::Missing);
        }
        self.id_to_value.get(id as usize)
    }

    /// Returns the number of unique values (excluding missing).
    pub fn unique_count(&self) -> usize {
        self.id_to_value.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner_is_deterministic_and_dense() {
        let mut interner = ValueInterner::new();
        let a = interner.intern(KeyValue::Text("a".to_string()));
        let b = interner.intern(KeyValue::Text("b".to_string()));
        let a_again = interner.intern(KeyValue::Text("a".to_string()));

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(a_again, a);
        assert_eq!(interner.unique_count(), 2);
        assert_eq!(interner.get(b), Some(&KeyValue::Text("b".to_string())));
    }

    #[test]
    fn missing_always_maps_to_the_reserved_id() {
        let mut interner = ValueInterner::new();
        assert_eq!(interner.intern(KeyValue::Missing), VALUE_ID_MISSING);
        interner.intern(KeyValue::Integer(7));
        assert_eq!(interner.intern_scalar(&ScalarValue::Missing), VALUE_ID_MISSING);
        assert_eq!(interner.get(VALUE_ID_MISSING), Some(&KeyValue::Missing));
        assert_eq!(interner.unique_count(), 1);
    }

    #[test]
    fn ordered_float_nan_and_zero_semantics() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        fn hash_of(value: OrderedFloat) -> u64 {
            let mut hasher = DefaultHasher::new();
            value.hash(&mut hasher);
            hasher.finish()
        }

        let nan_a = OrderedFloat::new(f64::NAN);
        let nan_b = OrderedFloat::new(f64::NAN);
        assert_eq!(nan_a, nan_b);
        assert_eq!(hash_of(nan_a), hash_of(nan_b));

        let zero = OrderedFloat::new(0.0);
        let neg_zero = OrderedFloat::new(-0.0);
        assert_eq!(zero, neg_zero);
        assert_eq!(hash_of(zero), hash_of(neg_zero));
    }

    #[test]
    fn key_values_normalize_scalars() {
        assert_eq!(
            KeyValue::from(&ScalarValue::Number(-0.0)),
            KeyValue::from(&ScalarValue::Number(0.0))
        );
        assert_ne!(
            KeyValue::from(&ScalarValue::Number(1.0)),
            KeyValue::from(&ScalarValue::Integer(1))
        );
        assert_eq!(KeyValue::from(&ScalarValue::Missing), KeyValue::Missing);
    }
}
