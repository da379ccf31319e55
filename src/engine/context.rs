//! Session-scoped validation context.
//!
//! Holds the loaded dataset, the geometry reference and the thresholds for
//! one validation run. Checks receive it by shared reference and never
//! mutate it, which is what lets the orchestrator run them on several
//! threads at once.

use crate::config::Thresholds;
use crate::data::{Dataset, GeometryReference};

/// Read-only inputs shared by every check in a session.
#[derive(Debug)]
pub struct ValidationContext {
    dataset: Dataset,
    geometry: GeometryReference,
    has_geometry: bool,
    thresholds: Thresholds,
}

impl ValidationContext {
    /// Context without a geometry reference; geometry checks are skipped.
    pub fn new(dataset: Dataset, thresholds: Thresholds) -> Self {
        ValidationContext {
            dataset,
            geometry: GeometryReference::default(),
            has_geometry: false,
            thresholds,
        }
    }

    pub fn with_geometry(mut self, geometry: GeometryReference) -> Self {
        self.geometry = geometry;
        self.has_geometry = true;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The geometry reference; empty unless [`Self::has_geometry`].
    pub fn geometry(&self) -> &GeometryReference {
        &self.geometry
    }

    pub fn has_geometry(&self) -> bool {
        self.has_geometry
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}
