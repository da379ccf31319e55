//! Output formatting for hit-validate.
//!
//! Provides terminal, JSON, and JUnit XML output formatters.
//!
//! All formatters produce valid output for any ValidationReport input,
//! including a report with zero checks.

use crate::cli::args::OutputFormat;
use crate::engine::result::ValidationReport;
use crate::{CheckCategory, CheckResult};
use serde_json::json;

const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a validation report into a string
    fn format(&self, report: &ValidationReport) -> String;
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    verbose: bool,
    quiet: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, verbose: bool, quiet: bool) -> Self {
        TerminalFormatter {
            color,
            verbose,
            quiet,
        }
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.colorize(text, "32")
    }

    fn red(&self, text: &str) -> String {
        self.colorize(text, "31")
    }

    fn gray(&self, text: &str) -> String {
        self.colorize(text, "90")
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let mut output = String::new();

        // Header
        output.push_str(RULE);
        output.push('\n');
        output.push_str("hit-validate report\n");
        output.push_str(&format!("Dataset: {}\n", report.dataset));
        output.push_str(&format!("Hits: {}  Events: {}\n", report.hits, report.events));
        output.push_str(RULE);
        output.push_str("\n\n");

        for category in CheckCategory::ALL {
            let checks: Vec<_> = report
                .checks
                .iter()
                .filter(|c| c.category == category)
                .filter(|c| !self.quiet || c.result.as_ref().is_some_and(CheckResult::is_fail))
                .collect();

            if checks.is_empty() {
                continue;
            }

            output.push_str(&format!("{} CHECKS\n", category.to_string().to_uppercase()));

            for check in checks {
                let (status, message) = match &check.result {
                    Some(CheckResult::Pass {
                        message,
                        duration_ms,
                    }) => {
                        let msg = if self.verbose {
                            format!("{} ({}ms)", message, duration_ms)
                        } else {
                            message.clone()
                        };
                        (self.green("[PASS]"), msg)
                    }
                    Some(CheckResult::Fail {
                        message,
                        details,
                        duration_ms,
                    }) => {
                        let msg = if self.verbose {
                            format!("{} ({}ms)\n{}", message, duration_ms, indent(details))
                        } else {
                            message.clone()
                        };
                        (self.red("[FAIL]"), msg)
                    }
                    Some(CheckResult::Skip { reason }) => (self.gray("[SKIP]"), reason.clone()),
                    None => (self.gray("[----]"), "Not executed".to_string()),
                };

                output.push_str(&format!(
                    "  {} {}: {}: {}\n",
                    status, check.id, check.name, message
                ));
            }

            output.push('\n');
        }

        // Summary
        let summary = report.summary();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} passed, {} failed, {} skipped\n",
            summary.passed, summary.failed, summary.skipped
        ));
        output.push_str(&format!(
            "Total time: {:.1}s\n",
            report.total_duration_ms as f64 / 1000.0
        ));

        let exit_desc = if summary.failed > 0 {
            "failures detected"
        } else {
            "all checks passed"
        };
        output.push_str(&format!("Exit code: {} ({})\n", report.exit_code(), exit_desc));
        output.push_str(RULE);

        output
    }
}

fn indent(details: &str) -> String {
    details
        .lines()
        .map(|line| format!("         {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON formatter
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let value = json!({
            "timestamp": report.timestamp,
            "dataset": report.dataset,
            "hits": report.hits,
            "events": report.events,
            "total_duration_ms": report.total_duration_ms,
            "summary": report.summary(),
            "checks": report.checks,
        });

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        // A json! value always serializes.
        rendered.unwrap_or_default()
    }
}

/// JUnit XML formatter
pub struct JunitFormatter;

impl JunitFormatter {
    pub fn new() -> Self {
        JunitFormatter
    }

    fn escape_xml(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => result.push_str("&amp;"),
                '<' => result.push_str("&lt;"),
                '>' => result.push_str("&gt;"),
                '"' => result.push_str("&quot;"),
                '\'' => result.push_str("&apos;"),
                c => result.push(c),
            }
        }
        result
    }
}

impl Default for JunitFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JunitFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let summary = report.summary();
        output.push_str(&format!(
            "<testsuites name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\">\n",
            Self::escape_xml(&report.dataset),
            summary.total,
            summary.failed,
            summary.skipped,
            report.total_duration_ms as f64 / 1000.0
        ));

        // One test suite per category
        for category in CheckCategory::ALL {
            let checks: Vec<_> = report
                .checks
                .iter()
                .filter(|c| c.category == category)
                .collect();

            if checks.is_empty() {
                continue;
            }

            let suite_name = category.to_string().to_lowercase();
            let suite_failures = checks
                .iter()
                .filter(|c| matches!(&c.result, Some(CheckResult::Fail { .. })))
                .count();
            let suite_skipped = checks
                .iter()
                .filter(|c| matches!(&c.result, Some(CheckResult::Skip { .. })))
                .count();
            let suite_time: u64 = checks
                .iter()
                .filter_map(|c| c.result.as_ref().map(CheckResult::duration_ms))
                .sum();

            output.push_str(&format!(
                "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\">\n",
                suite_name,
                checks.len(),
                suite_failures,
                suite_skipped,
                suite_time as f64 / 1000.0
            ));

            for check in checks {
                let time = check.result.as_ref().map_or(0, CheckResult::duration_ms);

                output.push_str(&format!(
                    "    <testcase name=\"{}\" classname=\"hit-validate.{}\" time=\"{:.3}\"",
                    Self::escape_xml(&check.id),
                    suite_name,
                    time as f64 / 1000.0
                ));

                match &check.result {
                    Some(CheckResult::Pass { message, .. }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <system-out>{}</system-out>\n",
                            Self::escape_xml(message)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    Some(CheckResult::Fail {
                        message, details, ..
                    }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <failure message=\"{}\">{}</failure>\n",
                            Self::escape_xml(message),
                            Self::escape_xml(details)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    Some(CheckResult::Skip { reason }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <skipped message=\"{}\" />\n",
                            Self::escape_xml(reason)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    None => {
                        output.push_str(" />\n");
                    }
                }
            }

            output.push_str("  </testsuite>\n");
        }

        output.push_str("</testsuites>");
        output
    }
}

/// Get a formatter based on the output format
pub fn get_formatter(
    format: OutputFormat,
    no_color: bool,
    verbose: bool,
    quiet: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TerminalFormatter::new(!no_color, verbose, quiet)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Junit => Box::new(JunitFormatter::new()),
    }
}
