//! Split one side of a file's findings into buckets.

use crate::models::{Bucket, Issue};
use std::collections::BTreeMap;

/// Findings of one file side, bucketed by origin and severity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub buckets: BTreeMap<Bucket, Vec<Issue>>,
    /// Findings with an info/unrecognized level or no usable category.
    pub unbucketed: Vec<Issue>,
}

impl Classified {
    /// Findings in `bucket`, in input order.
    pub fn bucket(&self, bucket: Bucket) -> &[Issue] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Route every finding into exactly one bucket, or into `unbucketed`.
///
/// Order within each bucket follows input order.
pub fn classify(issues: impl IntoIterator<Item = Issue>) -> Classified {
    let mut classified = Classified::default();

    for issue in issues {
        match issue.bucket() {
            Some(bucket) => classified.buckets.entry(bucket).or_default().push(issue),
            None => classified.unbucketed.push(issue),
        }
    }

    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Origin, RawIssue, Severity};

    fn issue(issue_type: Option<&str>, category: Option<&str>, id: &str) -> Issue {
        Issue::enrich(RawIssue {
            issue_type: issue_type.map(String::from),
            validation_category: category.map(String::from),
            id: Some(id.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_classify_routes_all_four_buckets() {
        let classified = classify(vec![
            issue(Some("error"), Some("SDKViolation"), "a"),
            issue(Some("Warning"), Some("SDKViolation"), "b"),
            issue(Some("ERROR"), Some("ARMViolation"), "c"),
            issue(Some("warning"), Some("armviolation"), "d"),
        ]);

        let ids = |bucket| {
            classified
                .bucket(bucket)
                .iter()
                .map(|i| i.id().to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(ids(Bucket::new(Origin::Sdk, Severity::Error)), vec!["a"]);
        assert_eq!(ids(Bucket::new(Origin::Sdk, Severity::Warning)), vec!["b"]);
        assert_eq!(ids(Bucket::new(Origin::Arm, Severity::Error)), vec!["c"]);
        assert_eq!(ids(Bucket::new(Origin::Arm, Severity::Warning)), vec!["d"]);
        assert!(classified.unbucketed.is_empty());
    }

    #[test]
    fn test_classify_preserves_input_order() {
        let classified = classify(vec![
            issue(Some("Error"), Some("ARMViolation"), "3"),
            issue(Some("Error"), Some("ARMViolation"), "1"),
            issue(Some("Error"), Some("ARMViolation"), "2"),
        ]);

        let ids: Vec<_> = classified
            .bucket(Bucket::new(Origin::Arm, Severity::Error))
            .iter()
            .map(Issue::id)
            .collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_classify_excludes_unrecognized_and_info() {
        let classified = classify(vec![
            issue(Some("Critical"), Some("SDKViolation"), "critical"),
            issue(Some("Info"), Some("ARMViolation"), "info"),
            issue(None, Some("ARMViolation"), "no-type"),
            issue(Some("Error"), None, "no-category"),
        ]);

        assert!(classified.buckets.is_empty());
        let ids: Vec<_> = classified.unbucketed.iter().map(Issue::id).collect();
        assert_eq!(ids, vec!["critical", "info", "no-type", "no-category"]);
    }

    #[test]
    fn test_missing_bucket_is_empty_slice() {
        let classified = classify(Vec::new());
        assert!(classified
            .bucket(Bucket::new(Origin::Sdk, Severity::Error))
            .is_empty());
    }
}
