//! Error types.
//!
//! Two families are kept apart:
//! - [`ValidateError`] is a setup failure (unreadable file, missing column,
//!   bad geometry table). It aborts the session before any check runs.
//! - [`Violation`] is a data-quality finding produced by one check. It becomes
//!   a failed [`crate::CheckResult`] and never stops the other checks.

use std::fmt::Write as _;
use thiserror::Error;

/// Fatal setup errors.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: required column '{column}' is missing")]
    MissingColumn { path: String, column: String },

    #[error("{path}: column '{column}' appears more than once in the header")]
    DuplicateColumn { path: String, column: String },

    #[error("{path}:{line}: expected {expected} cells, found {found}")]
    RowLength {
        path: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{path}:{line}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        path: String,
        line: usize,
        column: String,
        value: String,
    },

    #[error("{path}: dataset contains no hits")]
    EmptyDataset { path: String },

    #[error("geometry table {path}: {message}")]
    Geometry { path: String, message: String },

    #[error("config {path}: {message}")]
    Config { path: String, message: String },
}

/// One layer whose hits stray outside the reference tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDeviation {
    pub volume_id: i64,
    pub layer_id: i64,
    /// Reference position in centimetres (radius or signed z).
    pub reference_cm: f64,
    pub min: f64,
    pub max: f64,
    /// Number of hits outside the tolerance window, when counted.
    pub outside: Option<usize>,
}

/// Data-quality violations, one flavour per check.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("There are missing values in the data ({total} null cells)")]
    MissingValues {
        total: usize,
        columns: Vec<(String, usize)>,
    },

    #[error(
        "There is duplicated data: duplicated rows returned {duplicated_rows} \
         and duplicated hitids in event returned {duplicated_hit_ids}"
    )]
    Duplicates {
        duplicated_rows: bool,
        duplicated_hit_ids: bool,
        identical_rows: usize,
        /// `(entry, hit_id, occurrences)` for repeated pairs.
        repeated_hit_ids: Vec<(i64, i64, usize)>,
    },

    #[error("There are multiple run numbers or lumi values within this data")]
    RunLumi { runs: Vec<String>, lumis: Vec<String> },

    #[error(
        "The number of unique evt identifiers does not match the number of events in the data. \
         For evt this is {pairs} and there are {events} events"
    )]
    EventIds {
        pairs: usize,
        events: usize,
        /// Entries carrying more than one evt value.
        inconsistent_entries: Vec<i64>,
    },

    #[error("There are {} events with no more than {threshold} hits", .events.len())]
    HitDensity {
        threshold: i64,
        /// `(entry, nhit)` for each failing event; `None` means nhit was null.
        events: Vec<(i64, Option<i64>)>,
    },

    #[error(
        "There are hits in the {region} that are more than {tolerance_cm} cm away from the hit layer position"
    )]
    GeometryBound {
        region: String,
        tolerance_cm: f64,
        deviations: Vec<LayerDeviation>,
    },

    #[error("There are {region} layers without any hits")]
    EmptyLayer {
        region: String,
        /// `(volume_id, layer_id)` pairs with no positioned hits.
        layers: Vec<(i64, i64)>,
    },

    #[error("There are layers that are not within the specified region of interest")]
    LayerRange { problems: Vec<String> },
}

/// Number of offending items listed before the details are truncated.
const DETAIL_LIMIT: usize = 10;

impl Violation {
    /// Diagnostic detail with offending values.
    pub fn details(&self) -> String {
        match self {
            Violation::MissingValues { columns, .. } => columns
                .iter()
                .map(|(name, count)| format!("{}: {}", name, count))
                .collect::<Vec<_>>()
                .join(", "),
            Violation::Duplicates {
                identical_rows,
                repeated_hit_ids,
                ..
            } => {
                let mut out = format!("{} fully identical rows", identical_rows);
                if !repeated_hit_ids.is_empty() {
                    let _ = write!(
                        out,
                        "; {} duplicated hitids: {}",
                        repeated_hit_ids.len(),
                        truncated(repeated_hit_ids.iter().map(|(entry, hit_id, n)| {
                            format!("entry {} hit_id {} x{}", entry, hit_id, n)
                        }))
                    );
                }
                out
            }
            Violation::RunLumi { runs, lumis } => format!(
                "run values: [{}]; lumi values: [{}]",
                truncated(runs.iter().cloned()),
                truncated(lumis.iter().cloned())
            ),
            Violation::EventIds {
                inconsistent_entries,
                ..
            } => {
                if inconsistent_entries.is_empty() {
                    "some entries have no evt value".to_string()
                } else {
                    format!(
                        "entries with several evt values: {}",
                        truncated(inconsistent_entries.iter().map(|e| e.to_string()))
                    )
                }
            }
            Violation::HitDensity { events, .. } => truncated(events.iter().map(|(entry, nhit)| {
                match nhit {
                    Some(n) => format!("entry {}: nhit {}", entry, n),
                    None => format!("entry {}: nhit missing", entry),
                }
            })),
            Violation::GeometryBound { deviations, .. } => {
                truncated(deviations.iter().map(|d| {
                    let mut line = format!(
                        "volume {} layer {}: reference {:.3}, observed [{:.3}, {:.3}]",
                        d.volume_id, d.layer_id, d.reference_cm, d.min, d.max
                    );
                    if let Some(outside) = d.outside {
                        let _ = write!(line, ", {} hits outside", outside);
                    }
                    line
                }))
            }
            Violation::EmptyLayer { layers, .. } => truncated(
                layers
                    .iter()
                    .map(|(volume, layer)| format!("volume {} layer {}", volume, layer)),
            ),
            Violation::LayerRange { problems } => problems.join("; "),
        }
    }
}

fn truncated(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.len() > DETAIL_LIMIT {
        format!(
            "{} (and {} more)",
            items[..DETAIL_LIMIT].join(", "),
            items.len() - DETAIL_LIMIT
        )
    } else {
        items.join(", ")
    }
}
