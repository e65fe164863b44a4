//! FILENAME: reshape-engine/src/engine.rs
//! Reshape Engine - the calculation core that executes a specification.
//!
//! This module takes a source Table and a ValidatedSpec and produces
//! the reshaped Table.
//!
//! Algorithm:
//! 1. Infer the direction once, up front, from which spec columns exist
//!    in the source
//! 2. Wide→long: partition spec rows by key tuple, emit one output row
//!    per (partition × source row)
//! 3. Long→wide: group source rows by the retained columns, place each
//!    row's value cells into the wide column its key tuple selects
//! 4. Optionally drop output rows whose value cells are all missing
//!
//! Output positions are computed from fixed offsets (partition index ×
//! row count, first-occurrence group index), so the executors stay
//! deterministic and the per-partition/per-group work could move onto
//! worker threads without reordering anything.

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use table::{Column, ScalarType, ScalarValue, Table};
use crate::error::ReshapeError;
use crate::intern::{GroupKey, ValueInterner};
use crate::validate::{validate, SpecError, ValidatedSpec};

// ============================================================================
// DIRECTION
// ============================================================================

/// Which way a pivot runs. Inferred from the specification's shape
/// relative to the source table, never passed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Every spec `name` is a source column: melt them into key/value rows.
    WideToLong,
    /// The spec's key and value columns are source columns: spread rows
    /// into the named wide columns.
    LongToWide,
}

/// Infers the pivot direction for `source` under `spec`.
///
/// If every wide name exists as a source column the reshape is
/// wide→long. If none do, the spec must describe the source's long
/// layout instead, so every key column and value variable has to be
/// present, and the reshape is long→wide. A partial overlap is
/// ambiguous and refused.
pub fn infer_direction(
    source: &Table,
    spec: &ValidatedSpec,
) -> Result<Direction, ReshapeError> {
    let (present, absent): (Vec<String>, Vec<String>) = spec
        .wide_names()
        .map(str::to_string)
        .partition(|n| source.has_column(n));

    if absent.is_empty() {
        return Ok(Direction::WideToLong);
    }
    if present.is_empty() {
        let missing: Vec<String> = spec
            .key_columns()
            .iter()
            .chain(spec.value_names().iter())
            .filter(|n| !source.has_column(n))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(Direction::LongToWide);
        }
        return Err(ReshapeError::UnknownColumn { columns: missing });
    }
    Err(ReshapeError::AmbiguousDirection { present, absent })
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Executes a reshape from a validated specification.
///
/// When `drop_na` is set, output rows whose value cells are all missing
/// are dropped; rows where only some value cells are missing are kept.
pub fn pivot(
    source: &Table,
    spec: &ValidatedSpec,
    drop_na: bool,
) -> Result<Table, ReshapeError> {
    let direction = infer_direction(source, spec)?;
    debug!(
        "pivot: {:?}, {} spec rows, {} key tuples, {} source rows",
        direction,
        spec.len(),
        spec.partition_count(),
        source.row_count()
    );
    match direction {
        Direction::WideToLong => pivot_longer(source, spec, drop_na),
        Direction::LongToWide => pivot_wider(source, spec, drop_na),
    }
}

/// Validates `spec` and executes the reshape in one call.
pub fn pivot_spec(
    source: &Table,
    spec: &Table,
    drop_na: bool,
) -> Result<Table, ReshapeError> {
    let validated = validate(spec)?;
    pivot(source, &validated, drop_na)
}

// ============================================================================
// WIDE -> LONG
// ============================================================================

fn pivot_longer(
    source: &Table,
    spec: &ValidatedSpec,
    drop_na: bool,
) -> Result<Table, ReshapeError> {
    let nrows = source.row_count();
    let wide_names: FxHashSet<&str> = spec.rows.iter().map(|r| r.name.as_str()).collect();

    // Retained columns: everything the spec does not melt.
    let id_indices: Vec<usize> = (0..source.col_count())
        .filter(|&i| source.name_at(i).map_or(false, |n| !wide_names.contains(n)))
        .collect();

    // The generated key and value columns must not shadow a retained column.
    for candidate in spec.key_columns.iter().chain(spec.value_order.iter()) {
        let collides = id_indices
            .iter()
            .any(|&i| source.name_at(i) == Some(candidate.as_str()));
        if collides {
            return Err(SpecError::RetainedCollision { column: candidate.clone() }.into());
        }
    }

    // Each value variable is fed by one source column per partition; all
    // of them must agree on a single element type. Checked before any
    // output is assembled.
    let mut value_types: FxHashMap<&str, (ScalarType, &str)> = FxHashMap::default();
    for row in &spec.rows {
        let column = source
            .column(&row.name)
            .ok_or_else(|| ReshapeError::UnknownColumn { columns: vec![row.name.clone()] })?;
        let actual = column.scalar_type();
        match value_types.get(row.value.as_str()) {
            Some(&(expected, first_column)) if expected != actual => {
                return Err(ReshapeError::TypeConflict {
                    value: row.value.clone(),
                    first_column: first_column.to_string(),
                    first_type: expected,
                    second_column: row.name.clone(),
                    second_type: actual,
                });
            }
            Some(_) => {}
            None => {
                value_types.insert(row.value.as_str(), (actual, row.name.as_str()));
            }
        }
    }

    // Per partition: which source column feeds each value variable,
    // aligned with the first-seen value order.
    let value_pos: FxHashMap<&str, usize> = spec
        .value_order
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();
    let mut partition_sources: Vec<Vec<Option<usize>>> = Vec::with_capacity(spec.partitions.len());
    for partition in &spec.partitions {
        let mut sources: Vec<Option<usize>> = vec![None; spec.value_order.len()];
        for &entry in &partition.entries {
            let row = &spec.rows[entry];
            if let (Some(&pos), Some(src)) =
                (value_pos.get(row.value.as_str()), source.column_index(&row.name))
            {
                sources[pos] = Some(src);
            }
        }
        partition_sources.push(sources);
    }

    let n_partitions = spec.partitions.len();
    let n_out = n_partitions * nrows;

    // Value columns, partition-major: output row p * nrows + r.
    let mut value_cells: Vec<Vec<ScalarValue>> = Vec::with_capacity(spec.value_order.len());
    for pos in 0..spec.value_order.len() {
        let mut cells: Vec<ScalarValue> = Vec::with_capacity(n_out);
        for sources in &partition_sources {
            match sources[pos].and_then(|src| source.column_at(src)) {
                Some(column) => {
                    for r in 0..nrows {
                        cells.push(column.value(r));
                    }
                }
                None => {
                    cells.resize(cells.len() + nrows, ScalarValue::Missing);
                }
            }
        }
        value_cells.push(cells);
    }

    let mask: Option<Vec<bool>> = if drop_na {
        let mask: Vec<bool> = (0..n_out)
            .map(|i| value_cells.iter().any(|cells| !cells[i].is_missing()))
            .collect();
        let dropped = mask.iter().filter(|&&kept| !kept).count();
        debug!("pivot_longer: dropping {} all-missing rows of {}", dropped, n_out);
        Some(mask)
    } else {
        None
    };

    let mut output = Table::new();

    for &i in &id_indices {
        if let (Some(name), Some(column)) = (source.name_at(i), source.column_at(i)) {
            let tiled = column.tiled(n_partitions);
            output.push_column(name, apply_mask(tiled, &mask))?;
        }
    }

    for (k, key_name) in spec.key_columns.iter().enumerate() {
        let mut cells: Vec<ScalarValue> = Vec::with_capacity(n_out);
        for partition in &spec.partitions {
            for _ in 0..nrows {
                cells.push(partition.key[k].clone());
            }
        }
        let column = Column::from_values(spec.key_types[k], cells)?;
        output.push_column(key_name.clone(), apply_mask(column, &mask))?;
    }

    for (pos, value_name) in spec.value_order.iter().enumerate() {
        let (scalar_type, _) = value_types[value_name.as_str()];
        let column = Column::from_values(scalar_type, std::mem::take(&mut value_cells[pos]))?;
        output.push_column(value_name.clone(), apply_mask(column, &mask))?;
    }

    Ok(output)
}

// ============================================================================
// LONG -> WIDE
// ============================================================================

fn pivot_wider(
    source: &Table,
    spec: &ValidatedSpec,
    drop_na: bool,
) -> Result<Table, ReshapeError> {
    let nrows = source.row_count();

    let key_indices: Vec<usize> = spec
        .key_columns
        .iter()
        .map(|n| {
            source
                .column_index(n)
                .ok_or_else(|| ReshapeError::UnknownColumn { columns: vec![n.clone()] })
        })
        .collect::<Result<_, _>>()?;
    let value_indices: FxHashMap<&str, usize> = spec
        .value_order
        .iter()
        .map(|n| {
            source
                .column_index(n)
                .map(|i| (n.as_str(), i))
                .ok_or_else(|| ReshapeError::UnknownColumn { columns: vec![n.clone()] })
        })
        .collect::<Result<_, _>>()?;

    // Retained columns: everything not referenced as a key or value.
    let referenced: FxHashSet<usize> = key_indices
        .iter()
        .copied()
        .chain(value_indices.values().copied())
        .collect();
    let group_indices: Vec<usize> =
        (0..source.col_count()).filter(|i| !referenced.contains(i)).collect();

    for row in &spec.rows {
        let collides = group_indices
            .iter()
            .any(|&i| source.name_at(i) == Some(row.name.as_str()));
        if collides {
            return Err(SpecError::RetainedCollision { column: row.name.clone() }.into());
        }
    }

    // Group rows by the retained columns, first-occurrence order.
    let mut group_interners: Vec<ValueInterner> =
        group_indices.iter().map(|_| ValueInterner::new()).collect();
    let mut group_lookup: FxHashMap<GroupKey, usize> = FxHashMap::default();
    let mut group_first_row: Vec<usize> = Vec::new();
    let mut group_of_row: Vec<usize> = Vec::with_capacity(nrows);
    for r in 0..nrows {
        let key: GroupKey = group_indices
            .iter()
            .zip(group_interners.iter_mut())
            .map(|(&ci, interner)| interner.intern_scalar(&source.value_at(ci, r)))
            .collect();
        let group = match group_lookup.get(&key) {
            Some(&group) => group,
            None => {
                let group = group_first_row.len();
                group_lookup.insert(key, group);
                group_first_row.push(r);
                group
            }
        };
        group_of_row.push(group);
    }
    let n_groups = group_first_row.len();
    debug!("pivot_wider: {} groups from {} source rows", n_groups, nrows);

    // Spec rows indexed by key tuple, interned per key column so source
    // rows can probe with a tuple of ids.
    let mut key_interners: Vec<ValueInterner> =
        key_indices.iter().map(|_| ValueInterner::new()).collect();
    let mut spec_by_tuple: FxHashMap<GroupKey, SmallVec<[usize; 2]>> = FxHashMap::default();
    for (s, row) in spec.rows.iter().enumerate() {
        let tuple: GroupKey = row
            .key
            .iter()
            .zip(key_interners.iter_mut())
            .map(|(value, interner)| interner.intern_scalar(value))
            .collect();
        spec_by_tuple.entry(tuple).or_default().push(s);
    }

    // One cell per (spec row, group). `matched` remembers the source row
    // that filled a cell: a second match is ambiguous and refused, even
    // when the values agree.
    let mut cells: Vec<Vec<ScalarValue>> = spec
        .rows
        .iter()
        .map(|_| vec![ScalarValue::Missing; n_groups])
        .collect();
    let mut matched: Vec<Vec<Option<usize>>> =
        spec.rows.iter().map(|_| vec![None; n_groups]).collect();

    for r in 0..nrows {
        let tuple: GroupKey = key_indices
            .iter()
            .zip(key_interners.iter_mut())
            .map(|(&ci, interner)| interner.intern_scalar(&source.value_at(ci, r)))
            .collect();
        let Some(entries) = spec_by_tuple.get(&tuple) else {
            // Key tuple described by no spec row: the row still anchors
            // its group but contributes no cell.
            continue;
        };
        let group = group_of_row[r];
        for &s in entries {
            if let Some(first_row) = matched[s][group] {
                return Err(ReshapeError::DuplicateKey {
                    name: spec.rows[s].name.clone(),
                    first_row,
                    second_row: r,
                });
            }
            matched[s][group] = Some(r);
            let value_index = value_indices[spec.rows[s].value.as_str()];
            cells[s][group] = source.value_at(value_index, r);
        }
    }

    let mask: Option<Vec<bool>> = if drop_na {
        let mask: Vec<bool> = (0..n_groups)
            .map(|g| cells.iter().any(|column| !column[g].is_missing()))
            .collect();
        let dropped = mask.iter().filter(|&&kept| !kept).count();
        debug!("pivot_wider: dropping {} all-missing groups of {}", dropped, n_groups);
        Some(mask)
    } else {
        None
    };

    let mut output = Table::new();

    for &i in &group_indices {
        if let (Some(name), Some(column)) = (source.name_at(i), source.column_at(i)) {
            let taken = column.taken(&group_first_row);
            output.push_column(name, apply_mask(taken, &mask))?;
        }
    }

    for (row, row_cells) in spec.rows.iter().zip(cells) {
        let value_index = value_indices[row.value.as_str()];
        let scalar_type = source
            .column_at(value_index)
            .map(|c| c.scalar_type())
            .ok_or_else(|| ReshapeError::UnknownColumn { columns: vec![row.value.clone()] })?;
        let column = Column::from_values(scalar_type, row_cells)?;
        output.push_column(row.name.clone(), apply_mask(column, &mask))?;
    }

    Ok(output)
}

fn apply_mask(column: Column, mask: &Option<Vec<bool>>) -> Column {
    match mask {
        Some(mask) => column.filtered(mask),
        None => column,
    }
}

// ============================================================================
// TESTS
// ============================================================================
