//! Reference pixel geometry.
//!
//! The layer tables are stored transposed: every line is a column name
//! followed by one value per layer, e.g.
//!
//! ```text
//! r,29,68,109,160
//! z_max,265,265,265,265
//! ```
//!
//! Lengths are millimetres on disk and are converted with the unit scale
//! when loaded, so everything past this module works in centimetres. The
//! tables under `geometry/` are compiled in and used unless a path is given.

use super::{is_null, read_text, split_row};
use crate::error::ValidateError;
use crate::tolerances::{BARREL_LAYERS, ENDCAP_DISKS_CHECKED};
use std::path::Path;
use tracing::debug;

/// Barrel table built into the binary, used when no path is configured.
const BUILTIN_BARREL: &str = include_str!("../../geometry/PixelBarrel.csv");

/// Endcap table built into the binary, used when no path is configured.
const BUILTIN_ENDCAP: &str = include_str!("../../geometry/PixelEndcap.csv");

/// A barrel layer, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct BarrelLayer {
    pub layer: i64,
    /// Layer radius in cm
    pub r_cm: f64,
}

/// An endcap disk, numbered from 1. `z_cm` is the positive-side position.
#[derive(Debug, Clone, PartialEq)]
pub struct EndcapDisk {
    pub disk: i64,
    pub z_cm: f64,
}

/// Expected barrel radii and endcap z positions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryReference {
    barrel: Vec<BarrelLayer>,
    endcap: Vec<EndcapDisk>,
}

impl GeometryReference {
    pub fn new(barrel: Vec<BarrelLayer>, endcap: Vec<EndcapDisk>) -> Self {
        GeometryReference { barrel, endcap }
    }

    /// Load both layer tables, converting lengths with `unit_scale`.
    ///
    /// A table without a path comes from the copy built into the binary.
    pub fn load(
        barrel: Option<&Path>,
        endcap: Option<&Path>,
        unit_scale: f64,
    ) -> Result<Self, ValidateError> {
        let (barrel_source, barrel_text) =
            table_text(barrel, "built-in PixelBarrel.csv", BUILTIN_BARREL)?;
        let (endcap_source, endcap_text) =
            table_text(endcap, "built-in PixelEndcap.csv", BUILTIN_ENDCAP)?;
        let barrel_layers = parse_barrel(&barrel_source, &barrel_text, unit_scale)?;
        let endcap_disks = parse_endcap(&endcap_source, &endcap_text, unit_scale)?;

        debug!(
            barrel = %barrel_source,
            endcap = %endcap_source,
            barrel_layers = barrel_layers.len(),
            endcap_disks = endcap_disks.len(),
            unit_scale,
            "geometry reference loaded"
        );
        Ok(GeometryReference::new(barrel_layers, endcap_disks))
    }

    /// The built-in tables converted with `unit_scale`.
    pub fn builtin(unit_scale: f64) -> Result<Self, ValidateError> {
        Self::load(None, None, unit_scale)
    }

    pub fn barrel(&self) -> &[BarrelLayer] {
        &self.barrel
    }

    pub fn endcap(&self) -> &[EndcapDisk] {
        &self.endcap
    }

    /// Radius of a barrel layer in cm.
    pub fn barrel_radius(&self, layer: i64) -> Option<f64> {
        self.barrel.iter().find(|l| l.layer == layer).map(|l| l.r_cm)
    }

    /// Positive-side z of an endcap disk in cm.
    pub fn endcap_z(&self, disk: i64) -> Option<f64> {
        self.endcap.iter().find(|d| d.disk == disk).map(|d| d.z_cm)
    }
}

/// Name and content of one table, read from `path` when given.
fn table_text(
    path: Option<&Path>,
    builtin_name: &str,
    builtin: &str,
) -> Result<(String, String), ValidateError> {
    match path {
        Some(path) => Ok((path.display().to_string(), read_text(path)?)),
        None => Ok((builtin_name.to_string(), builtin.to_string())),
    }
}

/// Parse the barrel table; needs an `r` column covering every barrel layer.
pub fn parse_barrel(
    source: &str,
    content: &str,
    unit_scale: f64,
) -> Result<Vec<BarrelLayer>, ValidateError> {
    let table = TransposedTable::parse(source, content)?;
    let radii = table.scaled(source, "r", unit_scale)?;
    require_layers(source, "r", &radii, BARREL_LAYERS)?;

    Ok(radii
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            r.map(|r_cm| BarrelLayer {
                layer: i as i64 + 1,
                r_cm,
            })
        })
        .collect())
}

/// Parse the endcap table; needs a `z` column covering every checked disk.
///
/// Other columns (disk radii) are ignored.
pub fn parse_endcap(
    source: &str,
    content: &str,
    unit_scale: f64,
) -> Result<Vec<EndcapDisk>, ValidateError> {
    let table = TransposedTable::parse(source, content)?;
    let z = table.scaled(source, "z", unit_scale)?;
    require_layers(source, "z", &z, ENDCAP_DISKS_CHECKED)?;

    Ok(z.iter()
        .enumerate()
        .filter_map(|(i, z)| {
            z.map(|z_cm| EndcapDisk {
                disk: i as i64 + 1,
                z_cm,
            })
        })
        .collect())
}

fn require_layers(
    source: &str,
    column: &str,
    values: &[Option<f64>],
    layers: i64,
) -> Result<(), ValidateError> {
    let covered = values.iter().take(layers as usize).filter(|v| v.is_some()).count();
    if covered < layers as usize {
        return Err(ValidateError::Geometry {
            path: source.to_string(),
            message: format!(
                "column '{}' must give a value for each of the first {} layers, found {}",
                column, layers, covered
            ),
        });
    }
    Ok(())
}

/// Column name -> raw cells, in file order.
struct TransposedTable {
    columns: Vec<(String, Vec<String>)>,
}

impl TransposedTable {
    fn parse(source: &str, content: &str) -> Result<Self, ValidateError> {
        let columns: Vec<(String, Vec<String>)> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let cells = split_row(line, ',');
                let (name, values) = cells.split_first()?;
                Some((
                    name.to_string(),
                    values.iter().map(|v| v.to_string()).collect(),
                ))
            })
            .collect();

        if columns.is_empty() {
            return Err(ValidateError::Geometry {
                path: source.to_string(),
                message: "table is empty".to_string(),
            });
        }
        Ok(TransposedTable { columns })
    }

    fn column(&self, name: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    fn scaled(
        &self,
        source: &str,
        name: &str,
        unit_scale: f64,
    ) -> Result<Vec<Option<f64>>, ValidateError> {
        let cells = self.column(name).ok_or_else(|| ValidateError::Geometry {
            path: source.to_string(),
            message: format!("missing column '{}'", name),
        })?;
        scale_cells(source, name, cells, unit_scale)
    }
}

fn scale_cells(
    source: &str,
    name: &str,
    cells: &[String],
    unit_scale: f64,
) -> Result<Vec<Option<f64>>, ValidateError> {
    cells
        .iter()
        .map(|cell| {
            if is_null(cell) {
                return Ok(None);
            }
            cell.parse::<f64>()
                .map(|v| Some(v * unit_scale))
                .map_err(|_| ValidateError::Geometry {
                    path: source.to_string(),
                    message: format!("invalid value '{}' in column '{}'", cell, name),
                })
        })
        .collect()
}
