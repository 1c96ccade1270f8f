//! Plain-text console report.

use crate::models::{Bucket, FileReport, Issue, Origin, RunSummary, Severity};
use crate::report::{pluralize, sort_for_display};

const FILE_SEPARATOR: &str = "-----------------------------------------\n";

/// Render the console report for every file of the run.
pub fn generate_plain_report(run: &RunSummary) -> String {
    let mut output = String::from("\n---------- Linter Diff Results ----------\n\n");

    for report in run.files.values() {
        output.push_str(&generate_file_report(report));
    }

    output.push_str(&format!(
        "Total: {} new {} / {} new {}\n",
        run.counts.total_errors(),
        pluralize("error", run.counts.total_errors()),
        run.counts.total_warnings(),
        pluralize("warning", run.counts.total_warnings())
    ));

    output
}

/// Statistics and new-finding listings for one file.
pub fn generate_file_report(report: &FileReport) -> String {
    let mut output = format!("Config file: {}\n\n", report.name);

    for origin in Origin::ALL {
        output.push_str(&generate_statistics(report, origin));
    }

    for bucket in Bucket::ALL {
        let new = &report.partition(bucket).new;
        if new.is_empty() {
            continue;
        }

        let heading = format!(
            "Potential new {} {}s",
            bucket.origin.label(),
            bucket.severity.label().to_lowercase()
        );
        output.push_str(&format!("{}\n{}\n", heading, "=".repeat(heading.len())));
        output.push_str(&generate_issue_list(new));
    }

    output.push_str(FILE_SEPARATOR);
    output
}

fn generate_statistics(report: &FileReport, origin: Origin) -> String {
    let errors = Bucket::new(origin, Severity::Error);
    let warnings = Bucket::new(origin, Severity::Warning);
    let heading = format!("{} Errors/Warnings", origin.label());

    let mut block = format!("{}\n{}\n", heading, "=".repeat(heading.len()));
    block.push_str(&format!(
        "Errors:    Before: {} - After: {}\n",
        report.before_count(errors),
        report.partition(errors).len()
    ));
    block.push_str(&format!(
        "Warnings:  Before: {} - After: {}\n",
        report.before_count(warnings),
        report.partition(warnings).len()
    ));
    block.push_str(&format!("New {} Errors: {}\n", origin.label(), report.partition(errors).new.len()));
    block.push_str(&format!("New {} Warnings: {}\n", origin.label(), report.partition(warnings).new.len()));
    block.push_str(&format!(
        "Existing {} Errors: {}\n",
        origin.label(),
        report.partition(errors).existing.len()
    ));
    block.push_str(&format!(
        "Existing {} Warnings: {}\n\n",
        origin.label(),
        report.partition(warnings).existing.len()
    ));

    block
}

/// 1-indexed listing of findings in display order.
pub fn generate_issue_list(issues: &[Issue]) -> String {
    sort_for_display(issues)
        .into_iter()
        .enumerate()
        .map(|(index, issue)| {
            format!(
                "{}. {} - {}\n{}\n  at {}:{}\n\n",
                index + 1,
                issue.id(),
                issue.code(),
                issue.message(),
                issue.file_path,
                issue.line_number
            )
        })
        .collect()
}
