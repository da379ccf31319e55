//! Data module for hit-validate
//!
//! Contains the hit dataset, the reference pixel geometry, and the small
//! delimited-text reader both are loaded with.

pub mod dataset;
pub mod geometry;

pub use dataset::{Dataset, HitRecord, REQUIRED_COLUMNS};
pub use geometry::{BarrelLayer, EndcapDisk, GeometryReference};

use crate::error::ValidateError;
use std::path::Path;

/// Read a whole text file, mapping failures to a setup error.
pub(crate) fn read_text(path: &Path) -> Result<String, ValidateError> {
    std::fs::read_to_string(path).map_err(|source| ValidateError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Split one delimited line into trimmed cells.
///
/// A single pair of surrounding double quotes is removed from each cell.
/// Quoted delimiters are not supported: neither the hit export nor the
/// geometry tables contain them.
pub(crate) fn split_row(line: &str, delimiter: char) -> Vec<&str> {
    line.trim_end_matches(['\r', '\n'])
        .split(delimiter)
        .map(|cell| {
            let cell = cell.trim();
            cell.strip_prefix('"')
                .and_then(|c| c.strip_suffix('"'))
                .unwrap_or(cell)
        })
        .collect()
}

/// Whether a cell holds a null marker.
pub(crate) fn is_null(cell: &str) -> bool {
    cell.is_empty()
        || ["nan", "na", "null", "none"]
            .iter()
            .any(|marker| cell.eq_ignore_ascii_case(marker))
}
