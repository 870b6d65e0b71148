//! Verify command

use crate::comparator::{compare_dirs, CompareOptions};
use crate::types::{DiffReport, ReplikError};
use crate::ui::ProgressReporter;
use crate::Config;
use console::style;

/// Run the verify operation.
///
/// Returns `true` when the two trees are indistinguishable; the caller
/// maps `false` to a non-zero exit code.
pub fn run(config: &Config) -> Result<bool, ReplikError> {
    let options = CompareOptions {
        report_all: config.report_all,
        check_times: config.check_times,
    };

    let reporter = if config.quiet || config.json {
        None
    } else {
        let reporter = ProgressReporter::new();
        reporter.start_verify(&config.source, &config.destination);
        Some(reporter)
    };

    let report = compare_dirs(&config.source, &config.destination, options)?;

    if let Some(reporter) = reporter {
        reporter.finish_verify(report.len());
    }

    if config.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|error| ReplikError::Validation(format!("cannot render report: {error}")))?;
        println!("{rendered}");
    } else if !config.quiet {
        print_report(&report);
    }

    Ok(report.is_identical())
}

fn print_report(report: &DiffReport) {
    for difference in report.iter() {
        println!("{} {}", style("✗").red().bold(), difference);
    }

    if report.is_identical() {
        println!("{} trees are identical", style("✓").green().bold());
    } else {
        println!(
            "{} {} difference(s) found",
            style("✗").red().bold(),
            report.len()
        );
    }
}
