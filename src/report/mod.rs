//! Report rendering.
//!
//! Two presentations of the same [`RunSummary`]: rich markdown for the pull
//! request comment ([`generator`]) and plain text for the console
//! ([`plain`]). Both list findings in display order (file, line, rule id).

pub mod generator;
pub mod plain;

use crate::cli::Args;
use crate::config::{Config, Contact};
use crate::models::{Bucket, Issue, NewIssueCounts, RunSummary};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The rendered comment handed to the posting layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedReport {
    pub title: String,
    pub summary: String,
    pub text: String,
}

/// Links, contacts and limits that shape a rendered report.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub target_branch: String,
    pub repo_slug: String,
    pub git_ref: String,
    pub pr_number: Option<String>,
    pub job_id: Option<String>,
    pub guidelines_url: String,
    pub issues_url: String,
    pub feedback_email: String,
    pub build_url_template: String,
    pub sdk_contact: Contact,
    pub arm_contact: Contact,
    pub max_text_chars: usize,
}

impl ReportContext {
    /// Combine file configuration with the run's CI metadata.
    pub fn new(config: &Config, args: &Args) -> Self {
        Self {
            target_branch: args.target_branch.clone(),
            repo_slug: args
                .repo_slug
                .clone()
                .unwrap_or_else(|| config.report.repo_slug.clone()),
            git_ref: args
                .commit_sha
                .clone()
                .unwrap_or_else(|| config.report.git_ref.clone()),
            pr_number: args.pr_number().map(String::from),
            job_id: args.job_id.clone(),
            guidelines_url: config.report.guidelines_url.clone(),
            issues_url: config.report.issues_url.clone(),
            feedback_email: config.report.feedback_email.clone(),
            build_url_template: config.report.build_url_template.clone(),
            sdk_contact: config.contacts.sdk.clone(),
            arm_contact: config.contacts.arm.clone(),
            max_text_chars: config.report.max_text_chars,
        }
    }

    /// Link to `file` at the pull request head; empty for an empty path.
    pub fn blob_href(&self, file: &str) -> String {
        if file.is_empty() {
            return String::new();
        }
        format!(
            "https://github.com/{}/blob/{}/{}",
            self.repo_slug, self.git_ref, file
        )
    }

    /// Documentation anchor for a rule id.
    pub fn doc_url(&self, id: &str) -> String {
        format!("{}#{}", self.guidelines_url, id)
    }

    /// Link to the CI job's build output.
    pub fn build_url(&self) -> String {
        self.build_url_template
            .replace("{slug}", &self.repo_slug)
            .replace("{job}", self.job_id.as_deref().unwrap_or(""))
    }

    /// Link to the pull request page.
    pub fn pull_request_url(&self) -> String {
        format!(
            "https://github.com/{}/pull/{}",
            self.repo_slug,
            self.pr_number.as_deref().unwrap_or("")
        )
    }
}

/// `word` or its plural, depending on `count`.
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Display order: file path, then line, then rule id.
pub fn display_order(a: &Issue, b: &Issue) -> Ordering {
    a.file_path
        .cmp(&b.file_path)
        .then_with(|| a.line_number.cmp(&b.line_number))
        .then_with(|| a.id().cmp(b.id()))
}

/// Findings sorted for display. The sort is stable: ties keep input order.
pub fn sort_for_display(issues: &[Issue]) -> Vec<&Issue> {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by(|a, b| display_order(a, b));
    sorted
}

/// `"<N> new error(s) / <M> new warning(s)"`.
pub fn title(counts: &NewIssueCounts) -> String {
    let errors = counts.total_errors();
    let warnings = counts.total_warnings();
    format!(
        "{} new {} / {} new {}",
        errors,
        pluralize("error", errors),
        warnings,
        pluralize("warning", warnings)
    )
}

/// One summary line for a bucket, linking to its first detail block.
pub fn summary_line(bucket: Bucket, count: usize) -> String {
    let padding = "&nbsp;&nbsp;&nbsp;";

    if count == 0 {
        return format!(
            "{padding}:white_check_mark:{padding}**No** new {}\n\n",
            pluralize(&bucket.label(), count)
        );
    }

    format!(
        "{padding}{}{padding}[**{}** new {}](#user-content-{})\n\n",
        bucket.severity.icon(),
        count,
        pluralize(&bucket.label(), count),
        bucket.anchor()
    )
}

/// The four-line bullet summary.
pub fn summary(counts: &NewIssueCounts, ctx: &ReportContext) -> String {
    let mut out = format!(
        "Compared to the target branch (**{}**), this pull request introduces:\n\n",
        ctx.target_branch
    );
    for bucket in Bucket::ALL {
        out.push_str(&summary_line(bucket, counts.get(bucket)));
    }
    out
}

/// Render the comment for a completed run.
pub fn render(run: &RunSummary, ctx: &ReportContext) -> RenderedReport {
    RenderedReport {
        title: title(&run.counts),
        summary: summary(&run.counts, ctx),
        text: generator::generate_comment_text(run, ctx),
    }
}

/// The report produced when the diff document could not be read.
pub fn failure_report(ctx: &ReportContext) -> RenderedReport {
    let body = format!(
        "Please examine the failure in PR {}\r\nThe failing job is {}",
        ctx.pull_request_url(),
        ctx.build_url()
    );
    let link = generator::email_link(
        "report this failure",
        &ctx.feedback_email,
        "Failure | Linter Diff Tool",
        &body,
    );
    let summary = format!(
        "The Linter Diff tool failed to produce a result. Work with your reviewer to examine \
         the lint results manually before merging.\n\nPlease {}!",
        link
    );

    RenderedReport {
        title: "Failed to produce a result".to_string(),
        text: format!("{}<br><br>\n\n{}", summary, generator::generate_footer(ctx)),
        summary,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::Config;
    use crate::models::{Issue, RawIssue};

    use super::ReportContext;

    pub fn context() -> ReportContext {
        let config = Config::default();
        ReportContext {
            target_branch: "main".to_string(),
            repo_slug: "owner/specs".to_string(),
            git_ref: "abc123".to_string(),
            pr_number: Some("42".to_string()),
            job_id: Some("777".to_string()),
            guidelines_url: "https://example.com/rules.md".to_string(),
            issues_url: "https://example.com/issues".to_string(),
            feedback_email: "tooling@example.com".to_string(),
            build_url_template: config.report.build_url_template,
            sdk_contact: config.contacts.sdk,
            arm_contact: config.contacts.arm,
            max_text_chars: config.report.max_text_chars,
        }
    }

    pub fn issue(issue_type: &str, category: &str, id: &str, jsonref: &str) -> Issue {
        Issue::enrich(RawIssue {
            issue_type: Some(issue_type.to_string()),
            code: Some(format!("{}Code", id)),
            id: Some(id.to_string()),
            message: Some(format!("Problem \"{}\" found", id)),
            validation_category: Some(category.to_string()),
            jsonref: Some(jsonref.to_string()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{context, issue};
    use super::*;
    use crate::models::{Origin, Severity};

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("error", 0), "errors");
        assert_eq!(pluralize("error", 1), "error");
        assert_eq!(pluralize("error", 2), "errors");
    }

    #[test]
    fn test_title() {
        let mut counts = NewIssueCounts::default();
        assert_eq!(title(&counts), "0 new errors / 0 new warnings");

        counts.sdk_errors = 1;
        counts.arm_warnings = 1;
        assert_eq!(title(&counts), "1 new error / 1 new warning");

        counts.arm_errors = 2;
        counts.sdk_warnings = 4;
        assert_eq!(title(&counts), "3 new errors / 5 new warnings");
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let a = issue("Error", "SDKViolation", "R1", "specification/a.json:5:1");
        let mut b = issue("Error", "SDKViolation", "R1", "specification/a.json:5:9");
        b.raw.message = Some("second".to_string());
        let c = issue("Error", "SDKViolation", "R0", "specification/b.json:1:1");

        let forward = vec![a.clone(), b.clone(), c.clone()];
        let sorted: Vec<_> = sort_for_display(&forward).into_iter().cloned().collect();
        assert_eq!(sorted, vec![a.clone(), b.clone(), c.clone()]);

        let backward = vec![c.clone(), b.clone(), a.clone()];
        let sorted: Vec<_> = sort_for_display(&backward).into_iter().cloned().collect();
        assert_eq!(sorted, vec![b, a, c]);
    }

    #[test]
    fn test_sort_keys() {
        let issues = vec![
            issue("Error", "SDKViolation", "R9", "specification/b.json:1:1"),
            issue("Error", "SDKViolation", "R2", "specification/a.json:10:1"),
            issue("Error", "SDKViolation", "R1", "specification/a.json:10:1"),
            issue("Error", "SDKViolation", "R5", "specification/a.json:2:1"),
        ];
        let ids: Vec<_> = sort_for_display(&issues).iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["R5", "R1", "R2", "R9"]);
    }

    #[test]
    fn test_summary_lines() {
        let zero = summary_line(Bucket::new(Origin::Sdk, Severity::Error), 0);
        assert!(zero.contains(":white_check_mark:"));
        assert!(zero.contains("**No** new SDK Errors"));
        assert!(!zero.contains("#user-content"));

        let one = summary_line(Bucket::new(Origin::Arm, Severity::Warning), 1);
        assert!(one.contains(":warning:"));
        assert!(one.contains("[**1** new ARM Warning](#user-content-ARM-Warnings)"));

        let many = summary_line(Bucket::new(Origin::Arm, Severity::Error), 3);
        assert!(many.contains(":x:"));
        assert!(many.contains("**3** new ARM Errors"));
    }

    #[test]
    fn test_summary_order() {
        let counts = NewIssueCounts {
            sdk_errors: 1,
            arm_errors: 2,
            sdk_warnings: 3,
            arm_warnings: 4,
        };
        let text = summary(&counts, &context());

        assert!(text.starts_with("Compared to the target branch (**main**)"));
        let sdk_error = text.find("SDK Error").unwrap();
        let arm_error = text.find("ARM Error").unwrap();
        let sdk_warning = text.find("SDK Warning").unwrap();
        let arm_warning = text.find("ARM Warning").unwrap();
        assert!(sdk_error < arm_error && arm_error < sdk_warning && sdk_warning < arm_warning);
    }

    #[test]
    fn test_context_links() {
        let ctx = context();
        assert_eq!(
            ctx.blob_href("specification/a.json"),
            "https://github.com/owner/specs/blob/abc123/specification/a.json"
        );
        assert_eq!(ctx.blob_href(""), "");
        assert_eq!(ctx.doc_url("R3016"), "https://example.com/rules.md#R3016");
        assert_eq!(ctx.build_url(), "https://travis-ci.org/owner/specs/jobs/777");
        assert_eq!(ctx.pull_request_url(), "https://github.com/owner/specs/pull/42");
    }

    #[test]
    fn test_failure_report() {
        let report = failure_report(&context());
        assert_eq!(report.title, "Failed to produce a result");
        assert!(report.summary.contains("failed to produce a result"));
        assert!(report.summary.contains("mailto:tooling@example.com"));
        assert!(report.text.starts_with(&report.summary));
    }

    #[test]
    fn test_rendered_report_serializes_three_fields() {
        let report = RenderedReport {
            title: "t".to_string(),
            summary: "s".to_string(),
            text: "x".to_string(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"title": "t", "summary": "s", "text": "x"}));
    }
}
