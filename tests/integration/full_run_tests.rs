//! Full run integration tests.
//!
//! Tests for orchestration, fail-fast behavior, parallel execution and
//! result aggregation.

use crate::fixtures::{clean_rows, Workspace};
use hit_validate::engine::context::ValidationContext;
use hit_validate::engine::orchestrator::{
    create_all_checks, CheckOrchestrator, OrchestratorConfig, RegisteredCheck,
};
use hit_validate::data::Dataset;
use hit_validate::{run_validation, CheckCategory, Thresholds, Violation};

// Helper to create a check that always passes
fn create_passing_check(id: &str, category: CheckCategory) -> RegisteredCheck {
    let id_clone = id.to_string();
    RegisteredCheck {
        id: id.to_string(),
        name: format!("Test {}", id),
        category,
        description: format!("Test check {}", id),
        check_fn: Box::new(move |_: &ValidationContext| Ok(format!("{} passed", id_clone))),
        requires_geometry: false,
    }
}

// Helper to create a check that always fails
fn create_failing_check(id: &str, category: CheckCategory) -> RegisteredCheck {
    RegisteredCheck {
        id: id.to_string(),
        name: format!("Test {}", id),
        category,
        description: format!("Test check {}", id),
        check_fn: Box::new(|_: &ValidationContext| {
            Err(Violation::LayerRange {
                problems: vec!["test failure".to_string()],
            })
        }),
        requires_geometry: false,
    }
}

fn empty_context() -> ValidationContext {
    ValidationContext::new(Dataset::from_hits(Vec::new()), Thresholds::default())
}

#[test]
fn test_orchestrator_run_all_checks() {
    let mut orchestrator = CheckOrchestrator::new(OrchestratorConfig::default());
    orchestrator.register_check(create_passing_check("TEST-001", CheckCategory::Integrity));
    orchestrator.register_check(create_passing_check("TEST-002", CheckCategory::Density));
    orchestrator.register_check(create_passing_check("TEST-003", CheckCategory::Geometry));

    let summary = orchestrator.run_all(&empty_context()).summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.passed, 3);
    assert_eq!(summary.failed, 0);
}

#[test]
fn test_orchestrator_run_category() {
    let mut orchestrator = CheckOrchestrator::new(OrchestratorConfig::default());
    orchestrator.register_check(create_passing_check("INT-1", CheckCategory::Integrity));
    orchestrator.register_check(create_passing_check("INT-2", CheckCategory::Integrity));
    orchestrator.register_check(create_passing_check("DEN-1", CheckCategory::Density));

    let summary = orchestrator
        .run_category(CheckCategory::Integrity, &empty_context())
        .summary();
    assert_eq!(summary.total, 2);
}

#[test]
fn test_orchestrator_run_selected() {
    let mut orchestrator = CheckOrchestrator::new(OrchestratorConfig::default());
    for id in ["TEST-001", "TEST-002", "TEST-003"] {
        orchestrator.register_check(create_passing_check(id, CheckCategory::Integrity));
    }

    let selected = orchestrator.select(None, &[], &["TEST-002".to_string()]);
    let report = orchestrator.run_checks(&selected, &empty_context());
    let ids: Vec<_> = report.checks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["TEST-001", "TEST-003"]);
}

#[test]
fn test_orchestrator_fail_fast() {
    let mut orchestrator = CheckOrchestrator::new(OrchestratorConfig {
        fail_fast: true,
        ..Default::default()
    });
    orchestrator.register_check(create_passing_check("TEST-001", CheckCategory::Integrity));
    orchestrator.register_check(create_failing_check("TEST-002", CheckCategory::Integrity));
    orchestrator.register_check(create_passing_check("TEST-003", CheckCategory::Integrity));

    let summary = orchestrator.run_all(&empty_context()).summary();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total, 2);
}

#[test]
fn test_failure_does_not_block_other_checks() {
    let mut orchestrator = CheckOrchestrator::new(OrchestratorConfig::default());
    orchestrator.register_check(create_failing_check("TEST-001", CheckCategory::Integrity));
    orchestrator.register_check(create_passing_check("TEST-002", CheckCategory::Integrity));

    let summary = orchestrator.run_all(&empty_context()).summary();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.passed, 1);
}

#[test]
fn test_parallel_matches_sequential() {
    let workspace = Workspace::new();
    let mut rows = clean_rows();
    rows[0].run = Some(99);
    let mut config = workspace.config(&rows);

    let sequential = run_validation(&config).unwrap();
    config.parallel = true;
    config.max_parallel = 3;
    let parallel = run_validation(&config).unwrap();

    let outcome = |report: &hit_validate::ValidationReport| -> Vec<(String, bool)> {
        report
            .checks
            .iter()
            .map(|c| (c.id.clone(), c.result.as_ref().is_some_and(|r| r.is_fail())))
            .collect()
    };
    assert_eq!(outcome(&sequential), outcome(&parallel));
    assert_eq!(parallel.summary().failed, 1);
}

#[test]
fn test_registered_checks_cover_every_category() {
    let checks = create_all_checks();
    for category in CheckCategory::ALL {
        assert!(checks.iter().any(|c| c.category == category), "{} has no checks", category);
    }
    let geometry_bound: Vec<_> = checks
        .iter()
        .filter(|c| c.requires_geometry)
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(geometry_bound, vec!["GEO-001", "GEO-002"]);
}

#[test]
fn test_unknown_only_id_selects_nothing() {
    let workspace = Workspace::new();
    let mut config = workspace.config(&clean_rows());
    config.only_checks = vec!["NOPE-999".to_string()];

    let report = run_validation(&config).unwrap();
    assert_eq!(report.summary().total, 0);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_report_metadata() {
    let workspace = Workspace::new();
    let rows = clean_rows();
    let report = run_validation(&workspace.config(&rows)).unwrap();

    assert!(report.dataset.ends_with("hits.csv"));
    assert_eq!(report.hits, rows.len());
    assert!(report.timestamp > 0);
}
