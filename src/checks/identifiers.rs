//! Identifier consistency checks (ID-001, ID-002).

use super::CheckOutcome;
use crate::engine::context::ValidationContext;
use crate::error::Violation;
use std::collections::{BTreeMap, BTreeSet};

/// Run ID-001: exactly one run number and one lumi value in the dataset.
///
/// A null counts as a value of its own.
pub fn check_run_lumi(ctx: &ValidationContext) -> CheckOutcome {
    let hits = ctx.dataset().hits();
    let runs: BTreeSet<Option<i64>> = hits.iter().map(|h| h.run).collect();
    let lumis: BTreeSet<Option<i64>> = hits.iter().map(|h| h.lumi).collect();

    if runs.len() == 1 && lumis.len() == 1 {
        return Ok(format!(
            "Single run {} and lumi {}",
            describe(runs.iter()),
            describe(lumis.iter())
        ));
    }

    Err(Violation::RunLumi {
        runs: runs.iter().map(|v| describe(std::iter::once(v))).collect(),
        lumis: lumis.iter().map(|v| describe(std::iter::once(v))).collect(),
    })
}

/// Run ID-002: one evt identifier per entry.
///
/// Compares the number of distinct `(entry, evt)` pairs with the number of
/// distinct entries. Hits with a null evt do not form a pair.
pub fn check_event_ids(ctx: &ValidationContext) -> CheckOutcome {
    let dataset = ctx.dataset();
    let mut evts_by_entry: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
    for hit in dataset.hits() {
        let evts = evts_by_entry.entry(hit.entry).or_default();
        if let Some(evt) = hit.evt {
            evts.insert(evt);
        }
    }

    let events = evts_by_entry.len();
    let pairs: usize = evts_by_entry.values().map(BTreeSet::len).sum();

    if pairs == events {
        return Ok(format!("Each of the {} events carries a single evt identifier", events));
    }

    let inconsistent_entries = evts_by_entry
        .iter()
        .filter(|(_, evts)| evts.len() > 1)
        .map(|(entry, _)| *entry)
        .collect();

    Err(Violation::EventIds {
        pairs,
        events,
        inconsistent_entries,
    })
}

fn describe<'a>(values: impl Iterator<Item = &'a Option<i64>>) -> String {
    values
        .map(|v| match v {
            Some(v) => v.to_string(),
            None => "null".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
