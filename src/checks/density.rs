//! Hit density check (DEN-001).

use super::CheckOutcome;
use crate::engine::context::ValidationContext;
use crate::error::Violation;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Run DEN-001: every event must have more than the minimum number of hits.
///
/// `nhit` is expected to be constant within an event. Every distinct value
/// seen for an event is compared and a null `nhit` fails; a failing event is
/// reported once, with its null or smallest value.
pub fn check_hit_density(ctx: &ValidationContext) -> CheckOutcome {
    let threshold = ctx.thresholds().min_hits_per_event;

    let mut nhit_by_entry: BTreeMap<i64, BTreeSet<Option<i64>>> = BTreeMap::new();
    for hit in ctx.dataset().hits() {
        nhit_by_entry.entry(hit.entry).or_default().insert(hit.nhit);
    }

    let mut events = Vec::new();
    for (entry, values) in &nhit_by_entry {
        if values.len() > 1 {
            debug!(entry, distinct = values.len(), "nhit varies within event");
        }
        // Ordered with None first, so this is the null or smallest failing value.
        if let Some(nhit) = values
            .iter()
            .find(|nhit| !matches!(nhit, Some(n) if *n > threshold))
        {
            events.push((*entry, *nhit));
        }
    }

    if events.is_empty() {
        return Ok(format!(
            "All {} events have more than {} hits",
            nhit_by_entry.len(),
            threshold
        ));
    }

    Err(Violation::HitDensity { threshold, events })
}
