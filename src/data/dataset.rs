//! Hit dataset: one row per detector hit, indexed by `(entry, subentry)`.
//!
//! The loader reads a flattened delimited-text export of the ntuple tree.
//! It only enforces the schema; every content invariant (no nulls, unique
//! hit ids, single run, ...) is left to the checks so it can be reported.

use super::{is_null, read_text, split_row};
use crate::error::ValidateError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// Columns every dataset must provide.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "entry",
    "hit_id",
    "evt",
    "run",
    "lumi",
    "x",
    "y",
    "z",
    "volume_id",
    "layer_id",
    "nhit",
];

/// Optional intra-event row index; when absent each event's rows are
/// numbered in file order.
const SUBENTRY_COLUMN: &str = "subentry";

/// A single detector hit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HitRecord {
    /// Event index
    pub entry: i64,
    /// Row within the event
    pub subentry: i64,
    pub hit_id: Option<i64>,
    /// Global event identifier
    pub evt: Option<i64>,
    pub run: Option<i64>,
    pub lumi: Option<i64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub volume_id: Option<i64>,
    pub layer_id: Option<i64>,
    /// Hit count of the owning event
    pub nhit: Option<i64>,
    /// Values of columns outside the known schema, in header order
    pub extra: Vec<Option<String>>,
}

impl HitRecord {
    /// Transverse radius `sqrt(x² + y²)`.
    pub fn r(&self) -> Option<f64> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(x.hypot(y)),
            _ => None,
        }
    }

    /// Whether the hit sits in the given detector volume and layer.
    pub fn is_in(&self, volume_id: i64, layer_id: i64) -> bool {
        self.volume_id == Some(volume_id) && self.layer_id == Some(layer_id)
    }

    /// Null flags for every known non-index column, in [`REQUIRED_COLUMNS`] order
    /// (without `entry`).
    pub fn null_flags(&self) -> [bool; 10] {
        [
            self.hit_id.is_none(),
            self.evt.is_none(),
            self.run.is_none(),
            self.lumi.is_none(),
            self.x.is_none(),
            self.y.is_none(),
            self.z.is_none(),
            self.volume_id.is_none(),
            self.layer_id.is_none(),
            self.nhit.is_none(),
        ]
    }
}

/// An ordered, read-only collection of hits.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    source: String,
    extra_columns: Vec<String>,
    hits: Vec<HitRecord>,
}

impl Dataset {
    /// Build a dataset from in-memory hits with no extra columns.
    pub fn from_hits(hits: Vec<HitRecord>) -> Self {
        Dataset {
            source: "<memory>".to_string(),
            extra_columns: Vec::new(),
            hits,
        }
    }

    /// Build a dataset carrying extra columns. Each hit's `extra` must have
    /// one slot per column name.
    pub fn with_extra_columns(extra_columns: Vec<String>, hits: Vec<HitRecord>) -> Self {
        Dataset {
            source: "<memory>".to_string(),
            extra_columns,
            hits,
        }
    }

    /// Load a dataset from a delimited text file.
    pub fn load(path: &Path, delimiter: char) -> Result<Self, ValidateError> {
        let content = read_text(path)?;
        Self::parse(&path.display().to_string(), &content, delimiter)
    }

    /// Parse a dataset from delimited text. `source` names it in errors.
    pub fn parse(source: &str, content: &str, delimiter: char) -> Result<Self, ValidateError> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let header: Vec<String> = match lines.next() {
            Some((_, line)) => split_row(line, delimiter)
                .into_iter()
                .map(str::to_string)
                .collect(),
            None => {
                return Err(ValidateError::EmptyDataset {
                    path: source.to_string(),
                })
            }
        };

        let schema = Schema::resolve(source, &header)?;
        let mut hits = Vec::new();
        let mut next_subentry: BTreeMap<i64, i64> = BTreeMap::new();

        for (line_no, line) in lines {
            let cells = split_row(line, delimiter);
            if cells.len() != header.len() {
                return Err(ValidateError::RowLength {
                    path: source.to_string(),
                    line: line_no,
                    expected: header.len(),
                    found: cells.len(),
                });
            }

            let cell = |column: usize| Cell {
                source,
                line: line_no,
                column: &header[column],
                value: cells[column],
            };

            let entry = cell(schema.required[0]).index()?;
            let subentry = match schema.subentry {
                Some(column) => cell(column).index()?,
                None => {
                    let counter = next_subentry.entry(entry).or_insert(0);
                    let sub = *counter;
                    *counter += 1;
                    sub
                }
            };

            hits.push(HitRecord {
                entry,
                subentry,
                hit_id: cell(schema.required[1]).int()?,
                evt: cell(schema.required[2]).int()?,
                run: cell(schema.required[3]).int()?,
                lumi: cell(schema.required[4]).int()?,
                x: cell(schema.required[5]).float()?,
                y: cell(schema.required[6]).float()?,
                z: cell(schema.required[7]).float()?,
                volume_id: cell(schema.required[8]).int()?,
                layer_id: cell(schema.required[9]).int()?,
                nhit: cell(schema.required[10]).int()?,
                extra: schema
                    .extra
                    .iter()
                    .map(|&column| {
                        let value = cells[column];
                        (!is_null(value)).then(|| value.to_string())
                    })
                    .collect(),
            });
        }

        if hits.is_empty() {
            return Err(ValidateError::EmptyDataset {
                path: source.to_string(),
            });
        }

        let dataset = Dataset {
            source: source.to_string(),
            extra_columns: schema.extra.iter().map(|&c| header[c].clone()).collect(),
            hits,
        };
        debug!(
            source,
            hits = dataset.len(),
            events = dataset.event_count(),
            extra_columns = dataset.extra_columns.len(),
            "dataset parsed"
        );
        Ok(dataset)
    }

    /// Where the dataset was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All hits in file order.
    pub fn hits(&self) -> &[HitRecord] {
        &self.hits
    }

    /// Names of columns outside the known schema.
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Distinct event indices.
    pub fn entries(&self) -> BTreeSet<i64> {
        self.hits.iter().map(|h| h.entry).collect()
    }

    /// Number of distinct events.
    pub fn event_count(&self) -> usize {
        self.entries().len()
    }

    /// Hits belonging to one detector volume.
    pub fn in_volume(&self, volume_id: i64) -> impl Iterator<Item = &HitRecord> {
        self.hits
            .iter()
            .filter(move |h| h.volume_id == Some(volume_id))
    }

    /// Hits belonging to one detector volume and layer.
    pub fn in_layer(&self, volume_id: i64, layer_id: i64) -> impl Iterator<Item = &HitRecord> {
        self.hits
            .iter()
            .filter(move |h| h.is_in(volume_id, layer_id))
    }
}

/// Header positions of the known columns.
struct Schema {
    /// Positions of [`REQUIRED_COLUMNS`], same order
    required: [usize; 11],
    subentry: Option<usize>,
    extra: Vec<usize>,
}

impl Schema {
    fn resolve(source: &str, header: &[String]) -> Result<Self, ValidateError> {
        let mut seen = BTreeSet::new();
        for name in header {
            if !seen.insert(name.as_str()) {
                return Err(ValidateError::DuplicateColumn {
                    path: source.to_string(),
                    column: name.clone(),
                });
            }
        }

        let position = |name: &str| header.iter().position(|h| h == name);

        let mut required = [0usize; 11];
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = position(name).ok_or_else(|| ValidateError::MissingColumn {
                path: source.to_string(),
                column: name.to_string(),
            })?;
        }

        let subentry = position(SUBENTRY_COLUMN);
        let extra = (0..header.len())
            .filter(|i| !required.contains(i) && Some(*i) != subentry)
            .collect();

        Ok(Schema {
            required,
            subentry,
            extra,
        })
    }
}

/// One cell being converted, with enough context for an error message.
struct Cell<'a> {
    source: &'a str,
    line: usize,
    column: &'a str,
    value: &'a str,
}

impl Cell<'_> {
    fn invalid(&self) -> ValidateError {
        ValidateError::InvalidValue {
            path: self.source.to_string(),
            line: self.line,
            column: self.column.to_string(),
            value: self.value.to_string(),
        }
    }

    /// Index columns may not be null.
    fn index(&self) -> Result<i64, ValidateError> {
        self.int()?.ok_or_else(|| self.invalid())
    }

    /// Integer cell. Integral floats are accepted since pandas exports integer
    /// columns that contain NaN as floats.
    fn int(&self) -> Result<Option<i64>, ValidateError> {
        if is_null(self.value) {
            return Ok(None);
        }
        if let Ok(v) = self.value.parse::<i64>() {
            return Ok(Some(v));
        }
        match self.value.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                Ok(Some(v as i64))
            }
            _ => Err(self.invalid()),
        }
    }

    fn float(&self) -> Result<Option<f64>, ValidateError> {
        if is_null(self.value) {
            return Ok(None);
        }
        self.value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| self.invalid())
    }
}
