//! hit-validate CLI entry point
//!
//! Sanity checks for detector-hit datasets.

use clap::Parser;
use hit_validate::cli::args::{CheckArgs, Cli, Command};
use hit_validate::cli::output::get_formatter;
use hit_validate::engine::orchestrator::create_all_checks;
use hit_validate::logging::init_tracing;
use hit_validate::version::get_build_info;
use hit_validate::{run_validation, CheckCategory, ValidateConfig};

use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    // Usage errors exit with 2 from inside clap
    let cli = Cli::parse();

    match cli.command {
        Command::Version => {
            println!("{}", get_build_info());
            ExitCode::SUCCESS
        }
        Command::List => {
            print_check_list();
            ExitCode::SUCCESS
        }
        Command::Check(args) => {
            init_tracing(args.verbose, args.color());
            run_checks(&args)
        }
    }
}

fn print_check_list() {
    let checks = create_all_checks();
    println!("Available checks:");

    for category in CheckCategory::ALL {
        println!();
        println!("{} CHECKS:", category.to_string().to_uppercase());
        for check in checks.iter().filter(|c| c.category == category) {
            println!("  {:<8} {}", check.id, check.name);
        }
    }
}

fn run_checks(args: &CheckArgs) -> ExitCode {
    let config = match ValidateConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("Error: {}", e);
            return ExitCode::from(3);
        }
    };

    let report = match run_validation(&config) {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "validation aborted");
            eprintln!("Error running checks: {}", e);
            return ExitCode::from(3);
        }
    };

    let formatter = get_formatter(args.format, !args.color(), args.verbose, args.quiet);
    println!("{}", formatter.format(&report));

    ExitCode::from(report.exit_code())
}
