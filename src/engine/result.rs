//! Result aggregation and reporting.
//!
//! Collects check results into a report and generates summaries.

use crate::{Check, CheckResult};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Result summary statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSummary {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total: u32,
    /// Sum of the individual check durations
    pub total_duration_ms: u64,
}

/// Validation report containing all check results
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub timestamp: u64,
    /// Path of the dataset the checks ran over
    pub dataset: String,
    pub hits: usize,
    pub events: usize,
    pub checks: Vec<Check>,
    pub total_duration_ms: u64,
}

impl ValidationReport {
    /// Create a new empty report
    pub fn new() -> Self {
        ValidationReport {
            timestamp: unix_timestamp(),
            dataset: String::new(),
            hits: 0,
            events: 0,
            checks: Vec::new(),
            total_duration_ms: 0,
        }
    }

    /// Calculate summary statistics
    pub fn summary(&self) -> ResultSummary {
        let mut summary = ResultSummary::default();

        for check in &self.checks {
            summary.total += 1;

            match &check.result {
                Some(CheckResult::Pass { duration_ms, .. }) => {
                    summary.passed += 1;
                    summary.total_duration_ms += duration_ms;
                }
                Some(CheckResult::Fail { duration_ms, .. }) => {
                    summary.failed += 1;
                    summary.total_duration_ms += duration_ms;
                }
                Some(CheckResult::Skip { .. }) | None => {
                    summary.skipped += 1;
                }
            }
        }

        summary
    }

    /// Checks that failed, in report order.
    pub fn failures(&self) -> Vec<&Check> {
        self.checks
            .iter()
            .filter(|c| c.result.as_ref().is_some_and(CheckResult::is_fail))
            .collect()
    }

    /// Process exit code for this report: 0 when nothing failed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.failures().is_empty() {
            0
        } else {
            1
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Result aggregator
#[derive(Debug, Default)]
pub struct ResultAggregator {
    report: ValidationReport,
}

impl ResultAggregator {
    pub fn new() -> Self {
        ResultAggregator {
            report: ValidationReport::new(),
        }
    }

    /// Record which dataset the results belong to.
    pub fn set_metadata(
        &mut self,
        dataset: String,
        hits: usize,
        events: usize,
        total_duration_ms: u64,
    ) {
        self.report.dataset = dataset;
        self.report.hits = hits;
        self.report.events = events;
        self.report.total_duration_ms = total_duration_ms;
    }

    pub fn add_result(&mut self, check: Check) {
        self.report.checks.push(check);
    }

    pub fn has_failures(&self) -> bool {
        self.report
            .checks
            .iter()
            .any(|c| c.result.as_ref().is_some_and(CheckResult::is_fail))
    }

    pub fn to_report(&self) -> ValidationReport {
        self.report.clone()
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
