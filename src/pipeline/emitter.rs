//! Structured result records for pipeline ingestion.
//!
//! Every new finding of a file becomes one `Result` record. A file's
//! records are written as one JSON array on one line of the append-only
//! pipe log.

use crate::models::{FileReport, Issue, IssueLevel};
use crate::report::ReportContext;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Record level understood by the ingestion side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultLevel {
    Error,
    Warning,
    Info,
}

impl From<IssueLevel> for ResultLevel {
    fn from(level: IssueLevel) -> Self {
        match level {
            IssueLevel::Error => ResultLevel::Error,
            IssueLevel::Warning => ResultLevel::Warning,
            IssueLevel::Info | IssueLevel::Unrecognized => ResultLevel::Info,
        }
    }
}

/// Category, provider, resource and position metadata of a finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultExtra {
    pub validation_category: Option<String>,
    pub provider_namespace: Option<String>,
    pub resource_type: Option<String>,
    pub jsonref: Option<String>,
    pub file_path: String,
    pub line_number: u32,
    pub sources: Vec<Value>,
}

/// A tagged link to where the finding lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPath {
    pub tag: String,
    pub path: String,
}

/// One structured finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Always `Result`.
    #[serde(rename = "type")]
    pub kind: String,
    pub level: ResultLevel,
    pub message: String,
    pub code: String,
    pub id: String,
    pub doc_url: String,
    pub time: DateTime<Utc>,
    pub extra: ResultExtra,
    pub paths: Vec<ResultPath>,
}

/// Build the record for one new finding.
pub fn compose_record(issue: &Issue, ctx: &ReportContext, time: DateTime<Utc>) -> ResultRecord {
    let location = if issue.file_path.is_empty() {
        String::new()
    } else {
        ctx.blob_href(&format!("{}#L{}", issue.file_path, issue.line_number))
    };

    ResultRecord {
        kind: "Result".to_string(),
        level: issue.level.into(),
        message: issue.message().replace('"', "'"),
        code: issue.code().to_string(),
        id: issue.id().to_string(),
        doc_url: ctx.doc_url(issue.id()),
        time,
        extra: ResultExtra {
            validation_category: issue.raw.validation_category.clone(),
            provider_namespace: issue.raw.provider_namespace.clone(),
            resource_type: issue.raw.resource_type.clone(),
            jsonref: issue.raw.jsonref.clone(),
            file_path: issue.file_path.clone(),
            line_number: issue.line_number,
            sources: issue.raw.sources.clone(),
        },
        paths: vec![ResultPath {
            tag: "New".to_string(),
            path: location,
        }],
    }
}

/// Records for every new finding of a file, in pipeline order.
pub fn records_for_file(
    report: &FileReport,
    ctx: &ReportContext,
    time: DateTime<Utc>,
) -> Vec<ResultRecord> {
    report
        .new_issues()
        .map(|issue| compose_record(issue, ctx, time))
        .collect()
}

/// Append-only, line-per-array structured log.
#[derive(Debug, Clone)]
pub struct PipeLog {
    path: PathBuf,
}

impl PipeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `records` as a single JSON array line.
    pub fn append(&self, records: &[ResultRecord]) -> Result<()> {
        let line = serde_json::to_string(records).context("Failed to serialize result records")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open pipe log {}", self.path.display()))?;
        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write pipe log {}", self.path.display()))?;

        debug!("Appended {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bucket, BucketDiff, Origin, Partition, Severity};
    use crate::report::test_support::{context, issue};
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn partition(new: Vec<Issue>) -> BucketDiff {
        BucketDiff {
            before_count: 0,
            partition: Partition {
                new,
                existing: vec![],
            },
        }
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(ResultLevel::from(IssueLevel::Error), ResultLevel::Error);
        assert_eq!(ResultLevel::from(IssueLevel::Warning), ResultLevel::Warning);
        assert_eq!(ResultLevel::from(IssueLevel::Info), ResultLevel::Info);
        assert_eq!(ResultLevel::from(IssueLevel::Unrecognized), ResultLevel::Info);
    }

    #[test]
    fn test_compose_record() {
        let ctx = context();
        let mut finding = issue("Error", "SDKViolation", "R3016", "specification/foo/service.json:12:3");
        finding.raw.provider_namespace = Some("Microsoft.Foo".to_string());
        finding.raw.sources = vec![json!("specification/foo/service.json:12:3")];

        let record = compose_record(&finding, &ctx, fixed_time());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["type"], "Result");
        assert_eq!(value["level"], "Error");
        assert_eq!(value["message"], "Problem 'R3016' found");
        assert_eq!(value["code"], "R3016Code");
        assert_eq!(value["id"], "R3016");
        assert_eq!(value["docUrl"], "https://example.com/rules.md#R3016");
        assert_eq!(value["time"], "2024-05-01T12:00:00Z");
        assert_eq!(value["extra"]["validationCategory"], "SDKViolation");
        assert_eq!(value["extra"]["providerNamespace"], "Microsoft.Foo");
        assert_eq!(value["extra"]["filePath"], "specification/foo/service.json");
        assert_eq!(value["extra"]["lineNumber"], 12);
        assert_eq!(value["extra"]["sources"].as_array().unwrap().len(), 1);
        assert_eq!(
            value["paths"],
            json!([{
                "tag": "New",
                "path": "https://github.com/owner/specs/blob/abc123/specification/foo/service.json#L12"
            }])
        );
    }

    #[test]
    fn test_record_without_position_has_empty_path() {
        let finding = issue("Warning", "ARMViolation", "R1", "#/definitions/Foo");
        let record = compose_record(&finding, &context(), fixed_time());
        assert_eq!(record.paths[0].path, "");
        assert_eq!(record.extra.line_number, 1);
    }

    #[test]
    fn test_records_follow_pipeline_order() {
        let ctx = context();
        let report = FileReport {
            name: "readme.md".to_string(),
            buckets: BTreeMap::from([
                (
                    Bucket::new(Origin::Arm, Severity::Warning),
                    partition(vec![issue("Warning", "ARMViolation", "aw", "specification/a.json:1:1")]),
                ),
                (
                    Bucket::new(Origin::Sdk, Severity::Warning),
                    partition(vec![issue("Warning", "SDKViolation", "sw", "specification/a.json:1:1")]),
                ),
                (
                    Bucket::new(Origin::Arm, Severity::Error),
                    partition(vec![issue("Error", "ARMViolation", "ae", "specification/a.json:1:1")]),
                ),
                (
                    Bucket::new(Origin::Sdk, Severity::Error),
                    partition(vec![issue("Error", "SDKViolation", "se", "specification/a.json:1:1")]),
                ),
            ]),
            unbucketed_new: vec![issue("Critical", "SDKViolation", "crit", "specification/a.json:1:1")],
        };

        let records = records_for_file(&report, &ctx, fixed_time());
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["se", "ae", "sw", "aw", "crit"]);
        assert_eq!(records[4].level, ResultLevel::Info);
    }

    #[test]
    fn test_pipe_log_appends_one_line_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let log = PipeLog::new(dir.path().join("pipe.log"));
        let record = compose_record(
            &issue("Error", "SDKViolation", "R1", "specification/a.json:1:1"),
            &context(),
            fixed_time(),
        );

        log.append(&[record.clone()]).unwrap();
        log.append(&[]).unwrap();
        log.append(&[record.clone(), record]).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "[]");

        let first: Vec<ResultRecord> = serde_json::from_str(lines[0]).unwrap();
        let third: Vec<ResultRecord> = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(third.len(), 2);
        assert_eq!(first[0].id, "R1");
    }
}
