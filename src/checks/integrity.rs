//! Integrity checks (INT-001, INT-002).
//!
//! Missing values and duplicated data.

use super::CheckOutcome;
use crate::data::{HitRecord, REQUIRED_COLUMNS};
use crate::engine::context::ValidationContext;
use crate::error::Violation;
use std::collections::{BTreeMap, HashSet};

/// Run INT-001: no field of any hit may be null.
pub fn check_missing_values(ctx: &ValidationContext) -> CheckOutcome {
    let dataset = ctx.dataset();
    let known = REQUIRED_COLUMNS.len() - 1;
    let mut counts = vec![0usize; known + dataset.extra_columns().len()];

    for hit in dataset.hits() {
        for (slot, null) in hit.null_flags().iter().enumerate() {
            if *null {
                counts[slot] += 1;
            }
        }
        for (slot, value) in hit.extra.iter().enumerate() {
            if value.is_none() {
                counts[known + slot] += 1;
            }
        }
    }

    let total: usize = counts.iter().sum();
    if total == 0 {
        return Ok(format!(
            "No missing values in {} hits across {} columns",
            dataset.len(),
            counts.len()
        ));
    }

    let names = REQUIRED_COLUMNS[1..]
        .iter()
        .map(|s| s.to_string())
        .chain(dataset.extra_columns().iter().cloned());
    let columns = names
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .collect();

    Err(Violation::MissingValues { total, columns })
}

/// Run INT-002: no fully identical rows and no repeated hit id within an event.
pub fn check_duplicates(ctx: &ValidationContext) -> CheckOutcome {
    let dataset = ctx.dataset();

    let mut seen = HashSet::with_capacity(dataset.len());
    let identical_rows = dataset
        .hits()
        .iter()
        .filter(|hit| !seen.insert(RowKey::of(hit)))
        .count();

    let mut per_event: BTreeMap<(i64, i64), usize> = BTreeMap::new();
    for hit in dataset.hits() {
        if let Some(hit_id) = hit.hit_id {
            *per_event.entry((hit.entry, hit_id)).or_insert(0) += 1;
        }
    }
    let repeated_hit_ids: Vec<(i64, i64, usize)> = per_event
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((entry, hit_id), count)| (entry, hit_id, count))
        .collect();

    if identical_rows == 0 && repeated_hit_ids.is_empty() {
        return Ok(format!(
            "All {} rows are distinct and hit ids are unique within each event",
            dataset.len()
        ));
    }

    Err(Violation::Duplicates {
        duplicated_rows: identical_rows > 0,
        duplicated_hit_ids: !repeated_hit_ids.is_empty(),
        identical_rows,
        repeated_hit_ids,
    })
}

/// Every column value of a hit except the `(entry, subentry)` index.
#[derive(PartialEq, Eq, Hash)]
struct RowKey<'a> {
    ints: [Option<i64>; 7],
    floats: [Option<u64>; 3],
    extra: &'a [Option<String>],
}

impl<'a> RowKey<'a> {
    fn of(hit: &'a HitRecord) -> Self {
        RowKey {
            ints: [
                hit.hit_id,
                hit.evt,
                hit.run,
                hit.lumi,
                hit.volume_id,
                hit.layer_id,
                hit.nhit,
            ],
            floats: [float_key(hit.x), float_key(hit.y), float_key(hit.z)],
            extra: &hit.extra,
        }
    }
}

/// Bit pattern of a float, with -0.0 folded onto 0.0.
fn float_key(value: Option<f64>) -> Option<u64> {
    value.map(|v| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() })
}
