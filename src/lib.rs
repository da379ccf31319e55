//! hit-validate library
//!
//! Sanity checks for detector-hit datasets exported from a particle-physics
//! simulation and reconstruction chain.
//!
//! This library provides:
//! - A loader for flattened per-hit tables and the reference pixel geometry
//! - Data-quality checks: completeness, uniqueness, run/lumi and event-id
//!   consistency, hit density, barrel/endcap position bounds, layer ranges
//! - A check orchestrator with selection, fail-fast and parallel execution
//! - Text, JSON and JUnit report formatters
//!
//! # Example
//!
//! ```no_run
//! use hit_validate::{run_validation, ValidateConfig};
//!
//! let config = ValidateConfig::new("hits.csv");
//! let report = run_validation(&config).expect("setup failed");
//! println!("Checks passed: {}", report.summary().passed);
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod logging;
pub mod tolerances;
pub mod version;

use data::{Dataset, GeometryReference};
use engine::context::ValidationContext;
use engine::orchestrator::{create_all_checks, CheckOrchestrator, OrchestratorConfig};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::info;

pub use config::{BoundPolicy, FileConfig, Thresholds, ValidateConfig};
pub use engine::result::{ResultSummary, ValidationReport};
pub use error::{ValidateError, Violation};

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckResult {
    /// Check passed
    Pass { message: String, duration_ms: u64 },
    /// Check found a data-quality violation
    Fail {
        message: String,
        details: String,
        duration_ms: u64,
    },
    /// Check could not run
    Skip { reason: String },
}

impl CheckResult {
    /// Convert a check outcome into a result with its measured duration.
    pub fn from_outcome(outcome: Result<String, Violation>, duration_ms: u64) -> Self {
        match outcome {
            Ok(message) => CheckResult::Pass {
                message,
                duration_ms,
            },
            Err(violation) => CheckResult::Fail {
                message: violation.to_string(),
                details: violation.details(),
                duration_ms,
            },
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, CheckResult::Fail { .. })
    }

    /// Duration, zero for skipped checks.
    pub fn duration_ms(&self) -> u64 {
        match self {
            CheckResult::Pass { duration_ms, .. } | CheckResult::Fail { duration_ms, .. } => {
                *duration_ms
            }
            CheckResult::Skip { .. } => 0,
        }
    }
}

/// Check category for grouping related checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    /// Missing values and duplicated rows
    Integrity,
    /// Run, lumi and event identifiers
    Identifiers,
    /// Hits per event
    Density,
    /// Hit positions against the reference geometry
    Geometry,
}

impl CheckCategory {
    /// All categories in report order.
    pub const ALL: [CheckCategory; 4] = [
        CheckCategory::Integrity,
        CheckCategory::Identifiers,
        CheckCategory::Density,
        CheckCategory::Geometry,
    ];
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckCategory::Integrity => write!(f, "Integrity"),
            CheckCategory::Identifiers => write!(f, "Identifiers"),
            CheckCategory::Density => write!(f, "Density"),
            CheckCategory::Geometry => write!(f, "Geometry"),
        }
    }
}

/// A validation check with its result.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    /// Unique identifier (e.g., "INT-001")
    pub id: String,
    /// Human-readable name
    pub name: String,
    pub category: CheckCategory,
    /// Description of what this check validates
    pub description: String,
    /// Result of the check (None if not yet executed)
    pub result: Option<CheckResult>,
}

/// Run validation checks over one dataset.
///
/// Loads the dataset, loads the geometry reference if any selected check
/// needs it, then runs the selected checks against one shared context.
///
/// # Errors
///
/// Returns a [`ValidateError`] when the dataset or geometry cannot be loaded.
/// Data-quality problems are not errors; they appear as failed checks in the
/// returned report.
pub fn run_validation(config: &ValidateConfig) -> Result<ValidationReport, ValidateError> {
    let start = Instant::now();

    let mut orchestrator = CheckOrchestrator::new(OrchestratorConfig {
        parallel: config.parallel,
        fail_fast: config.fail_fast,
        max_parallel: config.max_parallel,
    });
    orchestrator.register_checks(create_all_checks());

    let selected = orchestrator.select(
        config.categories.as_deref(),
        &config.only_checks,
        &config.skip_checks,
    );

    let dataset = Dataset::load(&config.dataset, config.delimiter)?;
    info!(
        dataset = %config.dataset.display(),
        hits = dataset.len(),
        events = dataset.event_count(),
        "dataset loaded"
    );

    let mut context = ValidationContext::new(dataset, config.thresholds.clone());
    if orchestrator.needs_geometry(&selected) {
        let geometry = GeometryReference::load(
            config.barrel_geometry.as_deref(),
            config.endcap_geometry.as_deref(),
            config.geometry_unit_scale,
        )?;
        context = context.with_geometry(geometry);
    }

    let mut report = orchestrator.run_checks(&selected, &context);
    report.total_duration_ms = start.elapsed().as_millis() as u64;

    let summary = report.summary();
    info!(
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        "validation finished"
    );
    Ok(report)
}
