//! Output formatting tests.
//!
//! Tests for terminal, JSON, and JUnit XML output formatters.

use hit_validate::cli::args::OutputFormat;
use hit_validate::cli::output::{
    get_formatter, JsonFormatter, JunitFormatter, OutputFormatter, TerminalFormatter,
};
use hit_validate::engine::result::ValidationReport;
use hit_validate::{Check, CheckCategory, CheckResult};

fn create_sample_report() -> ValidationReport {
    ValidationReport {
        timestamp: 1733500000,
        dataset: "data/hits.csv".to_string(),
        hits: 240_000,
        events: 3,
        checks: vec![
            Check {
                id: "INT-001".to_string(),
                name: "Missing Values".to_string(),
                category: CheckCategory::Integrity,
                description: "Verify no hit has a null field".to_string(),
                result: Some(CheckResult::Pass {
                    message: "No missing values".to_string(),
                    duration_ms: 12,
                }),
            },
            Check {
                id: "DEN-001".to_string(),
                name: "Hits per Event".to_string(),
                category: CheckCategory::Density,
                description: "Verify hit density".to_string(),
                result: Some(CheckResult::Fail {
                    message: "There are 1 events with no more than 80000 hits".to_string(),
                    details: "entry 2: nhit 512".to_string(),
                    duration_ms: 3,
                }),
            },
            Check {
                id: "GEO-001".to_string(),
                name: "Pixel Barrel Positions".to_string(),
                category: CheckCategory::Geometry,
                description: "Verify barrel radii".to_string(),
                result: Some(CheckResult::Skip {
                    reason: "Reference geometry not loaded".to_string(),
                }),
            },
        ],
        total_duration_ms: 1500,
    }
}

fn empty_report() -> ValidationReport {
    ValidationReport {
        timestamp: 1733500000,
        dataset: "empty.csv".to_string(),
        hits: 0,
        events: 0,
        checks: vec![],
        total_duration_ms: 0,
    }
}

#[test]
fn test_terminal_output_contains_checks_and_summary() {
    let output = TerminalFormatter::new(false, false, false).format(&create_sample_report());

    assert!(output.contains("hit-validate report"));
    assert!(output.contains("Dataset: data/hits.csv"));
    assert!(output.contains("INTEGRITY CHECKS"));
    assert!(output.contains("[PASS] INT-001"));
    assert!(output.contains("[FAIL] DEN-001"));
    assert!(output.contains("[SKIP] GEO-001"));
    assert!(output.contains("SUMMARY: 1 passed, 1 failed, 1 skipped"));
    assert!(output.contains("Exit code: 1 (failures detected)"));
    assert!(!output.contains("\x1b["));
}

#[test]
fn test_terminal_quiet_shows_only_failures() {
    let output = TerminalFormatter::new(false, false, true).format(&create_sample_report());

    assert!(output.contains("DEN-001"));
    assert!(!output.contains("INT-001"));
    assert!(!output.contains("GEO-001"));
    assert!(output.contains("SUMMARY:"));
}

#[test]
fn test_terminal_verbose_shows_details() {
    let output = TerminalFormatter::new(false, true, false).format(&create_sample_report());
    assert!(output.contains("entry 2: nhit 512"));
    assert!(output.contains("(12ms)"));
}

#[test]
fn test_terminal_color() {
    let output = TerminalFormatter::new(true, false, false).format(&create_sample_report());
    assert!(output.contains("\x1b[32m[PASS]\x1b[0m"));
    assert!(output.contains("\x1b[31m[FAIL]\x1b[0m"));
}

#[test]
fn test_json_output_is_valid() {
    let output = JsonFormatter::new(true).format(&create_sample_report());
    let value: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");

    assert_eq!(value["dataset"], "data/hits.csv");
    assert_eq!(value["summary"]["passed"], 1);
    assert_eq!(value["summary"]["failed"], 1);
    assert_eq!(value["summary"]["skipped"], 1);
    assert_eq!(value["checks"].as_array().unwrap().len(), 3);
    assert_eq!(value["checks"][1]["result"]["status"], "fail");
    assert_eq!(value["checks"][1]["result"]["details"], "entry 2: nhit 512");
    assert_eq!(value["checks"][1]["category"], "density");
}

#[test]
fn test_json_compact_has_no_newlines() {
    let output = JsonFormatter::new(false).format(&create_sample_report());
    assert!(!output.contains('\n'));
    assert!(serde_json::from_str::<serde_json::Value>(&output).is_ok());
}

#[test]
fn test_junit_output_structure() {
    let output = JunitFormatter::new().format(&create_sample_report());

    assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(output.contains("<testsuites name=\"data/hits.csv\" tests=\"3\" failures=\"1\""));
    assert!(output.contains("<testsuite name=\"density\""));
    assert!(output.contains("classname=\"hit-validate.geometry\""));
    assert_eq!(output.matches("<failure ").count(), 1);
    assert_eq!(output.matches("<skipped ").count(), 1);
    assert!(output.ends_with("</testsuites>"));
}

#[test]
fn test_empty_report_formats() {
    let report = empty_report();

    let text = TerminalFormatter::new(false, false, false).format(&report);
    assert!(text.contains("SUMMARY: 0 passed, 0 failed, 0 skipped"));
    assert!(text.contains("Exit code: 0 (all checks passed)"));

    let json: serde_json::Value =
        serde_json::from_str(&JsonFormatter::new(true).format(&report)).unwrap();
    assert_eq!(json["checks"].as_array().unwrap().len(), 0);

    let junit = JunitFormatter::new().format(&report);
    assert!(!junit.contains("<testsuite "));
}

#[test]
fn test_get_formatter_selects_format() {
    let report = create_sample_report();
    assert!(get_formatter(OutputFormat::Json, true, false, false)
        .format(&report)
        .starts_with('{'));
    assert!(get_formatter(OutputFormat::Junit, true, false, false)
        .format(&report)
        .starts_with("<?xml"));
    assert!(get_formatter(OutputFormat::Text, true, false, false)
        .format(&report)
        .contains("SUMMARY:"));
}
