//! Data models for the linter diff.
//!
//! This module contains the core data structures: the raw issues read from
//! the diff document, the enriched issues every later stage works on, and
//! the per-file and per-run summaries produced by the aggregator.

use crate::reference;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Category string marking an SDK-originated violation.
pub const SDK_CATEGORY: &str = "sdkviolation";

/// A finding exactly as the linter reported it.
///
/// Every field is optional: the producing tools do not guarantee a shape,
/// and a missing or oddly typed field must never abort the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIssue {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub issue_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub validation_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub provider_namespace: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub resource_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub jsonref: Option<String>,
    /// Contributing references, kept verbatim.
    #[serde(default, deserialize_with = "lenient_list")]
    pub sources: Vec<Value>,
}

/// Accept strings, numbers and booleans as text; treat null as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Accept a list or null; any other shape counts as a single source.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
    })
}

/// Before/after findings for one analyzed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileDiff {
    #[serde(default)]
    pub before: Vec<RawIssue>,
    #[serde(default)]
    pub after: Vec<RawIssue>,
}

/// The diff document written by the linter runner, one per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffInput {
    /// Analyzed file name to its before/after findings.
    #[serde(default)]
    pub files: BTreeMap<String, FileDiff>,
}

/// Severity of a finding, decoded once from its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueLevel {
    Error,
    Warning,
    Info,
    /// Missing, or anything other than error/warning/info.
    Unrecognized,
}

impl IssueLevel {
    /// Case-insensitive decode of a linter `type` value.
    pub fn from_type(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("error") => IssueLevel::Error,
            Some("warning") => IssueLevel::Warning,
            Some("info") => IssueLevel::Info,
            _ => IssueLevel::Unrecognized,
        }
    }

    /// The bucket severity, if this level is bucketed at all.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            IssueLevel::Error => Some(Severity::Error),
            IssueLevel::Warning => Some(Severity::Warning),
            IssueLevel::Info | IssueLevel::Unrecognized => None,
        }
    }
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueLevel::Error => write!(f, "Error"),
            IssueLevel::Warning => write!(f, "Warning"),
            IssueLevel::Info => write!(f, "Info"),
            IssueLevel::Unrecognized => write!(f, "Unrecognized"),
        }
    }
}

/// Which validation subsystem produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Origin {
    Sdk,
    Arm,
}

impl Origin {
    /// Both origins, in report order.
    pub const ALL: [Origin; 2] = [Origin::Sdk, Origin::Arm];

    /// Decode a `validationCategory`.
    ///
    /// `SDKViolation` (any case, no surrounding whitespace) is SDK; every
    /// other non-empty category is ARM. A missing or empty category leaves
    /// the finding unbucketed.
    pub fn from_category(value: Option<&str>) -> Option<Self> {
        let category = value?;
        if category.is_empty() {
            None
        } else if category.eq_ignore_ascii_case(SDK_CATEGORY) {
            Some(Origin::Sdk)
        } else {
            Some(Origin::Arm)
        }
    }

    /// Short label used in headings and summary lines.
    pub fn label(&self) -> &'static str {
        match self {
            Origin::Sdk => "SDK",
            Origin::Arm => "ARM",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Bucketed severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        }
    }

    /// GitHub emoji shortcode for a non-zero count.
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Error => ":x:",
            Severity::Warning => ":warning:",
        }
    }
}

/// An (origin, severity) partition of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bucket {
    pub origin: Origin,
    pub severity: Severity,
}

impl Bucket {
    /// All four buckets, in summary and pipeline order.
    pub const ALL: [Bucket; 4] = [
        Bucket::new(Origin::Sdk, Severity::Error),
        Bucket::new(Origin::Arm, Severity::Error),
        Bucket::new(Origin::Sdk, Severity::Warning),
        Bucket::new(Origin::Arm, Severity::Warning),
    ];

    pub const fn new(origin: Origin, severity: Severity) -> Self {
        Self { origin, severity }
    }

    /// Human label, e.g. `SDK Error`.
    pub fn label(&self) -> String {
        format!("{} {}", self.origin.label(), self.severity.label())
    }

    /// HTML anchor naming the bucket's first new-issue block, e.g. `SDK-Errors`.
    pub fn anchor(&self) -> String {
        format!("{}-{}s", self.origin.label(), self.severity.label())
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.origin.label(), self.severity.label())
    }
}

/// A finding with its level, origin and position resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub raw: RawIssue,
    pub level: IssueLevel,
    pub origin: Option<Origin>,
    /// Document path from `jsonref`, empty when it could not be extracted.
    pub file_path: String,
    /// 1-indexed line from `jsonref`, `1` when it could not be extracted.
    pub line_number: u32,
}

impl Issue {
    /// Decode and attach every derived field.
    pub fn enrich(raw: RawIssue) -> Self {
        let jsonref = raw.jsonref.as_deref().unwrap_or("");
        let file_path = reference::extract_file(jsonref)
            .unwrap_or_default()
            .to_string();
        let line_number = reference::extract_line(jsonref).unwrap_or(1);

        Self {
            level: IssueLevel::from_type(raw.issue_type.as_deref()),
            origin: Origin::from_category(raw.validation_category.as_deref()),
            file_path,
            line_number,
            raw,
        }
    }

    /// The bucket this finding belongs to, if any.
    pub fn bucket(&self) -> Option<Bucket> {
        Some(Bucket::new(self.origin?, self.level.severity()?))
    }

    pub fn id(&self) -> &str {
        self.raw.id.as_deref().unwrap_or("")
    }

    pub fn code(&self) -> &str {
        self.raw.code.as_deref().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        self.raw.message.as_deref().unwrap_or("")
    }

    pub fn jsonref(&self) -> &str {
        self.raw.jsonref.as_deref().unwrap_or("")
    }
}

/// "After" findings split by whether they already existed before.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub new: Vec<Issue>,
    pub existing: Vec<Issue>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.new.len() + self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.existing.is_empty()
    }
}

/// One bucket of one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketDiff {
    /// Number of "before" findings in the bucket.
    pub before_count: usize,
    pub partition: Partition,
}

/// Matched findings for one analyzed file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileReport {
    pub name: String,
    pub buckets: BTreeMap<Bucket, BucketDiff>,
    /// New findings that fall outside the four buckets.
    pub unbucketed_new: Vec<Issue>,
}

impl FileReport {
    /// The partition for `bucket`, or an empty one.
    pub fn partition(&self, bucket: Bucket) -> &Partition {
        static EMPTY: Partition = Partition {
            new: Vec::new(),
            existing: Vec::new(),
        };

        self.buckets
            .get(&bucket)
            .map(|diff| &diff.partition)
            .unwrap_or(&EMPTY)
    }

    pub fn before_count(&self, bucket: Bucket) -> usize {
        self.buckets.get(&bucket).map_or(0, |diff| diff.before_count)
    }

    /// Whether the file has anything to show for `origin`.
    pub fn has_issues_for(&self, origin: Origin) -> bool {
        self.buckets
            .iter()
            .any(|(bucket, diff)| bucket.origin == origin && !diff.partition.is_empty())
    }

    /// New findings in pipeline order, unbucketed ones last.
    pub fn new_issues(&self) -> impl Iterator<Item = &Issue> + '_ {
        Bucket::ALL
            .into_iter()
            .flat_map(move |bucket| self.partition(bucket).new.iter())
            .chain(self.unbucketed_new.iter())
    }
}

/// New-issue counters per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssueCounts {
    pub sdk_errors: usize,
    pub arm_errors: usize,
    pub sdk_warnings: usize,
    pub arm_warnings: usize,
}

impl NewIssueCounts {
    pub fn get(&self, bucket: Bucket) -> usize {
        match (bucket.origin, bucket.severity) {
            (Origin::Sdk, Severity::Error) => self.sdk_errors,
            (Origin::Arm, Severity::Error) => self.arm_errors,
            (Origin::Sdk, Severity::Warning) => self.sdk_warnings,
            (Origin::Arm, Severity::Warning) => self.arm_warnings,
        }
    }

    pub fn add(&mut self, bucket: Bucket, count: usize) {
        let slot = match (bucket.origin, bucket.severity) {
            (Origin::Sdk, Severity::Error) => &mut self.sdk_errors,
            (Origin::Arm, Severity::Error) => &mut self.arm_errors,
            (Origin::Sdk, Severity::Warning) => &mut self.sdk_warnings,
            (Origin::Arm, Severity::Warning) => &mut self.arm_warnings,
        };
        *slot += count;
    }

    pub fn total_errors(&self) -> usize {
        self.sdk_errors + self.arm_errors
    }

    pub fn total_warnings(&self) -> usize {
        self.sdk_warnings + self.arm_warnings
    }
}

/// Result of matching every file of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub counts: NewIssueCounts,
    /// File name to its report, ordered by name.
    pub files: BTreeMap<String, FileReport>,
}

impl RunSummary {
    /// Summary holding a single file.
    pub fn for_file(report: FileReport) -> Self {
        let mut counts = NewIssueCounts::default();
        for bucket in Bucket::ALL {
            counts.add(bucket, report.partition(bucket).new.len());
        }

        let mut files = BTreeMap::new();
        files.insert(report.name.clone(), report);

        Self { counts, files }
    }

    /// Fold another summary into this one.
    ///
    /// Counters are summed and file reports keyed by name, so the result is
    /// the same whatever order fragments arrive in.
    pub fn merge(&mut self, other: RunSummary) {
        for bucket in Bucket::ALL {
            self.counts.add(bucket, other.counts.get(bucket));
        }
        self.files.extend(other.files);
    }

    pub fn has_new_errors(&self) -> bool {
        self.counts.total_errors() > 0
    }
}
