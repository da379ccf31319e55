//! CLI integration tests.
//!
//! Tests for argument parsing and configuration precedence.

use crate::fixtures::Workspace;
use clap::Parser;
use hit_validate::cli::args::{CheckArgs, Cli, Command, OutputFormat};
use hit_validate::{BoundPolicy, CheckCategory, ValidateConfig, ValidateError};
use std::path::PathBuf;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["hit-validate"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("arguments parse")
}

fn check_args(args: &[&str]) -> CheckArgs {
    let mut argv = vec!["check"];
    argv.extend_from_slice(args);
    match parse(&argv).command {
        Command::Check(args) => args,
        other => panic!("expected check command, got {:?}", other),
    }
}

#[test]
fn test_default_check_args() {
    let args = check_args(&["hits.csv"]);
    assert_eq!(args.dataset, PathBuf::from("hits.csv"));
    assert_eq!(args.format, OutputFormat::Text);
    assert!(args.category.is_empty());
    assert!(!args.quiet);
    assert!(!args.verbose);
    assert!(!args.parallel);
    assert!(!args.fail_fast);
    assert_eq!(args.bound_policy, None);
}

#[test]
fn test_version_command() {
    assert!(matches!(parse(&["version"]).command, Command::Version));
}

#[test]
fn test_list_command() {
    assert!(matches!(parse(&["list"]).command, Command::List));
}

#[test]
fn test_dataset_is_required() {
    assert!(Cli::try_parse_from(["hit-validate", "check"]).is_err());
}

#[test]
fn test_repeatable_selection() {
    let args = check_args(&[
        "hits.csv",
        "--only",
        "GEO-001",
        "--only",
        "GEO-002",
        "--skip",
        "INT-002",
        "--category",
        "geometry",
        "--category",
        "density",
    ]);
    assert_eq!(args.only, vec!["GEO-001", "GEO-002"]);
    assert_eq!(args.skip, vec!["INT-002"]);
    assert_eq!(args.category, vec![CheckCategory::Geometry, CheckCategory::Density]);
}

#[test]
fn test_output_formats() {
    assert_eq!(check_args(&["h.csv", "--format", "json"]).format, OutputFormat::Json);
    assert_eq!(check_args(&["h.csv", "--format", "junit"]).format, OutputFormat::Junit);
    assert!(Cli::try_parse_from(["hit-validate", "check", "h.csv", "--format", "xml"]).is_err());
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    let argv = ["hit-validate", "check", "h.csv", "--quiet", "--verbose"];
    assert!(Cli::try_parse_from(argv).is_err());
}

#[test]
fn test_bound_policy_flag() {
    let args = check_args(&["h.csv", "--bound-policy", "per-hit"]);
    assert_eq!(args.bound_policy, Some(BoundPolicy::PerHit));
}

#[test]
fn test_no_color_disables_color() {
    let args = check_args(&["h.csv", "--no-color"]);
    assert!(!args.color());
}

#[test]
fn test_config_from_args() {
    let args = check_args(&[
        "h.csv",
        "--barrel",
        "b.csv",
        "--delimiter",
        ";",
        "--min-hits",
        "500",
        "--parallel",
        "--fail-fast",
    ]);
    let config = ValidateConfig::from_args(&args).unwrap();
    assert_eq!(config.barrel_geometry, Some(PathBuf::from("b.csv")));
    assert_eq!(config.endcap_geometry, None);
    assert_eq!(config.delimiter, ';');
    assert_eq!(config.thresholds.min_hits_per_event, 500);
    assert!(config.parallel);
    assert!(config.fail_fast);
    assert!(config.categories.is_none());
}

#[test]
fn test_flags_override_config_file() {
    let workspace = Workspace::new();
    let file = workspace.write(
        "hit-validate.toml",
        "min_hits_per_event = 1000\nendcap_tolerance_cm = 1.2\nbound_policy = \"per-hit\"\n",
    );
    let file = file.to_str().unwrap().to_string();

    let args = check_args(&["h.csv", "--config", &file, "--bound-policy", "extremal"]);
    let config = ValidateConfig::from_args(&args).unwrap();
    assert_eq!(config.thresholds.min_hits_per_event, 1000);
    assert_eq!(config.thresholds.endcap_tolerance_cm, 1.2);
    assert_eq!(config.thresholds.bound_policy, BoundPolicy::Extremal);
}

#[test]
fn test_bad_config_file_is_an_error() {
    let workspace = Workspace::new();
    let file = workspace.write("bad.toml", "min_hits_per_event = \"many\"\n");
    let file = file.to_str().unwrap().to_string();

    let args = check_args(&["h.csv", "--config", &file]);
    let err = ValidateConfig::from_args(&args).unwrap_err();
    assert!(matches!(err, ValidateError::Config { .. }));
}
