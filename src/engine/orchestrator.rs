//! Check execution orchestrator.
//!
//! Manages check registration, selection, and execution.
//!
//! # Graceful Degradation
//!
//! This module handles errors gracefully:
//! - Check panics: Caught via std::panic::catch_unwind, converted to Fail result
//! - Missing geometry: Checks that compare against it are reported as Skip
//! - Invalid check ID: Logged and ignored during selection
//! - Empty check list: Returns empty report (not an error)
//!
//! Every selected check completes (or is skipped) regardless of individual
//! check failures, unless fail_fast is enabled.

use crate::checks::{density, geometry, identifiers, integrity, CheckOutcome};
use crate::engine::context::ValidationContext;
use crate::engine::result::{ResultAggregator, ValidationReport};
use crate::{Check, CheckCategory, CheckResult};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub parallel: bool,
    pub fail_fast: bool,
    pub max_parallel: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            parallel: false,
            fail_fast: false,
            max_parallel: 4,
        }
    }
}

/// Signature shared by every check function.
pub type CheckFn = Box<dyn Fn(&ValidationContext) -> CheckOutcome + Send + Sync>;

/// A registered check with its execution function
pub struct RegisteredCheck {
    pub id: String,
    pub name: String,
    pub category: CheckCategory,
    pub description: String,
    pub check_fn: CheckFn,
    /// Compares hits against the reference geometry
    pub requires_geometry: bool,
}

impl RegisteredCheck {
    /// The check without a result, as listed by `hit-validate list`.
    pub fn describe(&self) -> Check {
        Check {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category,
            description: self.description.clone(),
            result: None,
        }
    }
}

/// Check orchestrator
pub struct CheckOrchestrator {
    config: OrchestratorConfig,
    checks: Vec<RegisteredCheck>,
}

impl CheckOrchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: OrchestratorConfig) -> Self {
        CheckOrchestrator {
            config,
            checks: Vec::new(),
        }
    }

    /// Register checks for execution
    pub fn register_checks(&mut self, checks: Vec<RegisteredCheck>) {
        self.checks.extend(checks);
    }

    /// Register a single check
    pub fn register_check(&mut self, check: RegisteredCheck) {
        self.checks.push(check);
    }

    /// Registered checks in registration order.
    pub fn checks(&self) -> &[RegisteredCheck] {
        &self.checks
    }

    /// Resolve a selection into check ids, in registration order.
    ///
    /// A check is selected when its category is in `categories` (or no
    /// categories are given), its id is in `only` (or `only` is empty), and
    /// its id is not in `skip`. Unknown ids are logged and ignored.
    pub fn select(
        &self,
        categories: Option<&[CheckCategory]>,
        only: &[String],
        skip: &[String],
    ) -> Vec<String> {
        for id in only.iter().chain(skip) {
            if !self.checks.iter().any(|c| &c.id == id) {
                warn!(check = %id, "unknown check id ignored");
            }
        }

        self.checks
            .iter()
            .filter(|c| categories.map_or(true, |cats| cats.contains(&c.category)))
            .filter(|c| only.is_empty() || only.contains(&c.id))
            .filter(|c| !skip.contains(&c.id))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Whether any of the given checks compares against the geometry.
    pub fn needs_geometry(&self, check_ids: &[String]) -> bool {
        self.checks
            .iter()
            .any(|c| c.requires_geometry && check_ids.contains(&c.id))
    }

    /// Run all registered checks
    pub fn run_all(&self, ctx: &ValidationContext) -> ValidationReport {
        let ids: Vec<String> = self.checks.iter().map(|c| c.id.clone()).collect();
        self.run_checks(&ids, ctx)
    }

    /// Run checks in a specific category
    pub fn run_category(
        &self,
        category: CheckCategory,
        ctx: &ValidationContext,
    ) -> ValidationReport {
        let ids = self.select(Some(&[category]), &[], &[]);
        self.run_checks(&ids, ctx)
    }

    /// Execute the specified checks against one context.
    ///
    /// Checks run in registration order. Ids that match no registered check
    /// are ignored.
    pub fn run_checks(&self, check_ids: &[String], ctx: &ValidationContext) -> ValidationReport {
        let start = Instant::now();
        let selected: Vec<&RegisteredCheck> = self
            .checks
            .iter()
            .filter(|c| check_ids.contains(&c.id))
            .collect();

        let mut aggregator = ResultAggregator::new();
        if self.config.parallel {
            self.run_parallel(&selected, ctx, &mut aggregator);
        } else {
            self.run_sequential(&selected, ctx, &mut aggregator);
        }

        let dataset = ctx.dataset();
        aggregator.set_metadata(
            dataset.source().to_string(),
            dataset.len(),
            dataset.event_count(),
            start.elapsed().as_millis() as u64,
        );
        aggregator.to_report()
    }

    /// Run checks sequentially
    fn run_sequential(
        &self,
        checks: &[&RegisteredCheck],
        ctx: &ValidationContext,
        aggregator: &mut ResultAggregator,
    ) {
        for check in checks {
            let result = execute_check(check, ctx);
            let failed = result.is_fail();
            aggregator.add_result(with_result(check, result));

            if self.config.fail_fast && failed {
                debug!(check = %check.id, "fail-fast: stopping after failure");
                break;
            }
        }
    }

    /// Run checks in batches of at most `max_parallel` scoped threads.
    fn run_parallel(
        &self,
        checks: &[&RegisteredCheck],
        ctx: &ValidationContext,
        aggregator: &mut ResultAggregator,
    ) {
        let batch_size = self.config.max_parallel.max(1);

        for batch in checks.chunks(batch_size) {
            let results: Vec<Check> = thread::scope(|s| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|check| {
                        let check: &RegisteredCheck = check;
                        (check, s.spawn(move || execute_check(check, ctx)))
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|(check, handle)| {
                        let result = handle.join().unwrap_or_else(|_| panicked(0));
                        with_result(check, result)
                    })
                    .collect()
            });

            for check in results {
                aggregator.add_result(check);
            }

            if self.config.fail_fast && aggregator.has_failures() {
                debug!("fail-fast: stopping after failed batch");
                break;
            }
        }
    }
}

/// Execute a single check, converting a panic into a failure.
fn execute_check(check: &RegisteredCheck, ctx: &ValidationContext) -> CheckResult {
    if check.requires_geometry && !ctx.has_geometry() {
        return CheckResult::Skip {
            reason: "Reference geometry not loaded".to_string(),
        };
    }

    let start = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| (check.check_fn)(ctx)));
    let elapsed = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(outcome) => {
            if let Err(violation) = &outcome {
                warn!(check = %check.id, "{}", violation);
            }
            debug!(
                check = %check.id,
                passed = outcome.is_ok(),
                elapsed_ms = elapsed,
                "check finished"
            );
            CheckResult::from_outcome(outcome, elapsed)
        }
        Err(_) => {
            warn!(check = %check.id, "check panicked");
            panicked(elapsed)
        }
    }
}

fn panicked(duration_ms: u64) -> CheckResult {
    CheckResult::Fail {
        message: "Check panicked during execution".to_string(),
        details: "An unexpected error occurred".to_string(),
        duration_ms,
    }
}

fn with_result(check: &RegisteredCheck, result: CheckResult) -> Check {
    Check {
        result: Some(result),
        ..check.describe()
    }
}

/// Create all registered checks with their execution functions
pub fn create_all_checks() -> Vec<RegisteredCheck> {
    let mut checks = Vec::new();

    // Integrity checks
    checks.push(RegisteredCheck {
        id: "INT-001".to_string(),
        name: "Missing Values".to_string(),
        category: CheckCategory::Integrity,
        description: "Verify no hit has a null field".to_string(),
        check_fn: Box::new(integrity::check_missing_values),
        requires_geometry: false,
    });

    checks.push(RegisteredCheck {
        id: "INT-002".to_string(),
        name: "Duplicated Data".to_string(),
        category: CheckCategory::Integrity,
        description: "Verify no identical rows and no repeated hit id within an event".to_string(),
        check_fn: Box::new(integrity::check_duplicates),
        requires_geometry: false,
    });

    // Identifier checks
    checks.push(RegisteredCheck {
        id: "ID-001".to_string(),
        name: "Run and Lumi".to_string(),
        category: CheckCategory::Identifiers,
        description: "Verify the dataset holds a single run and lumi section".to_string(),
        check_fn: Box::new(identifiers::check_run_lumi),
        requires_geometry: false,
    });

    checks.push(RegisteredCheck {
        id: "ID-002".to_string(),
        name: "Event Identifiers".to_string(),
        category: CheckCategory::Identifiers,
        description: "Verify each event carries exactly one evt identifier".to_string(),
        check_fn: Box::new(identifiers::check_event_ids),
        requires_geometry: false,
    });

    // Density checks
    checks.push(RegisteredCheck {
        id: "DEN-001".to_string(),
        name: "Hits per Event".to_string(),
        category: CheckCategory::Density,
        description: "Verify every event has more than the minimum number of hits".to_string(),
        check_fn: Box::new(density::check_hit_density),
        requires_geometry: false,
    });

    // Geometry checks
    checks.push(RegisteredCheck {
        id: "GEO-001".to_string(),
        name: "Pixel Barrel Positions".to_string(),
        category: CheckCategory::Geometry,
        description: "Verify barrel hit radii lie within tolerance of their layer".to_string(),
        check_fn: Box::new(geometry::check_pixel_barrel),
        requires_geometry: true,
    });

    checks.push(RegisteredCheck {
        id: "GEO-002".to_string(),
        name: "Pixel Endcap Positions".to_string(),
        category: CheckCategory::Geometry,
        description: "Verify endcap hit z positions lie within tolerance of their disk".to_string(),
        check_fn: Box::new(geometry::check_pixel_endcaps),
        requires_geometry: true,
    });

    checks.push(RegisteredCheck {
        id: "GEO-003".to_string(),
        name: "Volume and Layer Ranges".to_string(),
        category: CheckCategory::Geometry,
        description: "Verify volume and layer ids span exactly the pixel detector".to_string(),
        check_fn: Box::new(geometry::check_volume_and_layer_ids),
        requires_geometry: false,
    });

    checks
}
