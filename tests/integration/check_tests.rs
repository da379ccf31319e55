//! Check behaviour over datasets loaded from disk.

use crate::fixtures::{clean_rows, Row, Workspace, BARREL_R_MM};
use hit_validate::{
    run_validation, CheckCategory, CheckResult, ValidateConfig, ValidateError, ValidationReport,
};

fn run(workspace: &Workspace, rows: &[Row]) -> ValidationReport {
    run_validation(&workspace.config(rows)).expect("validation runs")
}

fn result<'a>(report: &'a ValidationReport, id: &str) -> &'a CheckResult {
    report
        .checks
        .iter()
        .find(|c| c.id == id)
        .and_then(|c| c.result.as_ref())
        .unwrap_or_else(|| panic!("{} not in report", id))
}

fn failure_message(report: &ValidationReport, id: &str) -> String {
    match result(report, id) {
        CheckResult::Fail { message, .. } => message.clone(),
        other => panic!("{} did not fail: {:?}", id, other),
    }
}

#[test]
fn test_clean_dataset_passes_every_check() {
    let workspace = Workspace::new();
    let report = run(&workspace, &clean_rows());
    let summary = report.summary();

    assert_eq!(summary.total, 8);
    assert_eq!(summary.passed, 8, "{:#?}", report.failures());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.events, 2);
}

#[test]
fn test_null_field_fails_completeness() {
    let workspace = Workspace::new();
    let mut rows = clean_rows();
    rows[3].lumi = None;
    let report = run(&workspace, &rows);

    assert!(result(&report, "INT-001").is_fail());
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_shared_hit_id_fails_uniqueness() {
    let workspace = Workspace::new();
    let mut rows = clean_rows();
    rows[0].hit_id = Some(5);
    rows[1].hit_id = Some(5);
    let report = run(&workspace, &rows);

    let message = failure_message(&report, "INT-002");
    assert!(message.contains("duplicated hitids in event returned true"));
}

#[test]
fn test_two_runs_fail_run_lumi() {
    let workspace = Workspace::new();
    let mut rows = clean_rows();
    for row in rows.iter_mut().filter(|r| r.entry == 1) {
        row.run = Some(2);
    }
    let report = run(&workspace, &rows);

    assert!(result(&report, "ID-001").is_fail());
    assert!(!result(&report, "ID-002").is_fail());
}

#[test]
fn test_second_evt_in_event_fails_event_ids() {
    let workspace = Workspace::new();
    let mut rows = clean_rows();
    rows[2].evt = Some(9999);
    let report = run(&workspace, &rows);

    match result(&report, "ID-002") {
        CheckResult::Fail { details, .. } => assert!(details.contains("several evt values: 0")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_sparse_event_fails_density() {
    let workspace = Workspace::new();
    let mut rows = clean_rows();
    for row in rows.iter_mut().filter(|r| r.entry == 0) {
        row.nhit = Some(80_000);
    }
    let report = run(&workspace, &rows);

    assert!(result(&report, "DEN-001").is_fail());
}

#[test]
fn test_barrel_hit_inside_tolerance_passes() {
    let workspace = Workspace::new();
    let mut rows = clean_rows();
    let mut extra = rows[0].clone();
    extra.subentry = 100;
    extra.hit_id = Some(100);
    extra.set_radius(BARREL_R_MM[0] / 10.0 + 0.1);
    rows.push(extra);
    let report = run(&workspace, &rows);

    assert!(matches!(result(&report, "GEO-001"), CheckResult::Pass { .. }));
}

#[test]
fn test_barrel_hit_outside_tolerance_fails() {
    let workspace = Workspace::new();
    let mut rows = clean_rows();
    rows[0].set_radius(BARREL_R_MM[0] / 10.0 + 0.5);
    let report = run(&workspace, &rows);

    let message = failure_message(&report, "GEO-001");
    assert!(message.contains("pixel barrel"));
    assert!(message.contains("0.4 cm"));
}

#[test]
fn test_endcap_hit_on_wrong_side_fails() {
    let workspace = Workspace::new();
    let mut rows = clean_rows();
    let negative = rows
        .iter_mut()
        .find(|r| r.volume_id == Some(1) && r.layer_id == Some(1))
        .unwrap();
    negative.z = negative.z.map(f64::abs);
    let report = run(&workspace, &rows);

    let message = failure_message(&report, "GEO-002");
    assert!(message.contains("0.8 cm"));
}

#[test]
fn test_removing_barrel_layer_four_fails_layer_range() {
    let workspace = Workspace::new();
    let rows: Vec<Row> = clean_rows()
        .into_iter()
        .filter(|r| !(r.volume_id == Some(2) && r.layer_id == Some(4)))
        .collect();
    let report = run(&workspace, &rows);

    assert!(result(&report, "GEO-003").is_fail());
    // Layer 4 also has no hits left to compare.
    assert!(result(&report, "GEO-001").is_fail());
}

#[test]
fn test_missing_geometry_is_fatal_only_when_needed() {
    let workspace = Workspace::new();
    let mut config = workspace.config(&clean_rows());
    config.barrel_geometry = Some(workspace.path("absent.csv"));

    let err = run_validation(&config).unwrap_err();
    assert!(matches!(err, ValidateError::Io { .. }));

    config.categories = Some(vec![CheckCategory::Integrity, CheckCategory::Density]);
    let report = run_validation(&config).expect("no geometry needed");
    assert_eq!(report.summary().total, 3);
}

#[test]
fn test_default_run_uses_builtin_geometry() {
    let workspace = Workspace::without_geometry();
    let config = ValidateConfig::new(workspace.write_rows(&clean_rows()));
    assert!(config.barrel_geometry.is_none());
    assert!(!workspace.path("PixelBarrel.csv").exists());

    let report = run_validation(&config).expect("built-in geometry loads");
    assert_eq!(report.summary().passed, 8, "{:#?}", report.failures());
}

#[test]
fn test_layer_range_runs_without_geometry() {
    let workspace = Workspace::new();
    let mut config = workspace.config(&clean_rows());
    config.barrel_geometry = Some(workspace.path("absent.csv"));
    config.only_checks = vec!["GEO-003".to_string()];

    let report = run_validation(&config).expect("GEO-003 needs no geometry");
    assert_eq!(report.summary().passed, 1);
}

#[test]
fn test_missing_column_is_fatal() {
    let workspace = Workspace::new();
    let path = workspace.write("broken.csv", "entry,hit_id,evt\n0,1,2\n");
    let mut config = workspace.config(&clean_rows());
    config.dataset = path;

    let err = run_validation(&config).unwrap_err();
    assert!(matches!(err, ValidateError::MissingColumn { .. }));
}

#[test]
fn test_per_hit_policy_agrees_with_extremal() {
    let workspace = Workspace::new();
    let mut rows = clean_rows();
    rows[1].set_radius(BARREL_R_MM[1] / 10.0 - 0.45);

    let mut config = workspace.config(&rows);
    let extremal = run_validation(&config).unwrap();
    config.thresholds.bound_policy = hit_validate::BoundPolicy::PerHit;
    let per_hit = run_validation(&config).unwrap();

    assert!(result(&extremal, "GEO-001").is_fail());
    match result(&per_hit, "GEO-001") {
        CheckResult::Fail { details, .. } => assert!(details.contains("1 hit")),
        other => panic!("unexpected {:?}", other),
    }
}
