//! Run-level aggregation.
//!
//! Matches every bucket of every analyzed file and folds the per-file
//! results into a single [`RunSummary`].

use crate::analysis::classifier::classify;
use crate::analysis::matcher::partition;
use crate::models::{Bucket, BucketDiff, DiffInput, FileDiff, FileReport, Issue, Origin, RunSummary};
use std::collections::BTreeMap;
use tracing::debug;

/// Match the before/after findings of one file.
pub fn compare_file(name: &str, diff: &FileDiff) -> FileReport {
    let before = classify(diff.before.iter().cloned().map(Issue::enrich));
    let after = classify(diff.after.iter().cloned().map(Issue::enrich));

    let buckets: BTreeMap<Bucket, BucketDiff> = Bucket::ALL
        .into_iter()
        .map(|bucket| {
            let diff = BucketDiff {
                before_count: before.bucket(bucket).len(),
                partition: partition(before.bucket(bucket), after.bucket(bucket)),
            };
            (bucket, diff)
        })
        .collect();

    let unbucketed = partition(&before.unbucketed, &after.unbucketed);

    let report = FileReport {
        name: name.to_string(),
        buckets,
        unbucketed_new: unbucketed.new,
    };
    log_file_statistics(&report);

    report
}

/// Match every file of the run, in file-name order.
pub fn aggregate(input: &DiffInput) -> RunSummary {
    let mut summary = RunSummary::default();

    for (name, diff) in &input.files {
        summary.merge(RunSummary::for_file(compare_file(name, diff)));
    }

    debug!(
        "Aggregated {} files: {} new errors, {} new warnings",
        summary.files.len(),
        summary.counts.total_errors(),
        summary.counts.total_warnings()
    );

    summary
}

fn log_file_statistics(report: &FileReport) {
    debug!("Config file: {}", report.name);

    for origin in Origin::ALL {
        for bucket in Bucket::ALL.into_iter().filter(|b| b.origin == origin) {
            let partition = report.partition(bucket);
            debug!(
                "{}s: before {} - after {} | new {} | existing {}",
                bucket,
                report.before_count(bucket),
                partition.len(),
                partition.new.len(),
                partition.existing.len()
            );
        }
    }

    if !report.unbucketed_new.is_empty() {
        debug!(
            "{} new findings outside the error/warning buckets",
            report.unbucketed_new.len()
        );
    }
}
