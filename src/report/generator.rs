//! Markdown comment generation.
//!
//! This module generates the pull request comment body: one section per
//! origin (SDK, then ARM), each listing the files with findings for that
//! origin, followed by a footer. Oversized bodies are replaced by a short
//! pointer to the build output.

use crate::config::Contact;
use crate::models::{Bucket, FileReport, Issue, IssueLevel, Origin, Partition, RunSummary, Severity};
use crate::report::{pluralize, sort_for_display, ReportContext};
use url::form_urlencoded;

const TABLE_HEADER: &str = "\n| # | | Rule | Location | Message |\n|-|-|------|----------|---------|\n";

/// Generate the full comment text, or the fallback when it is too long.
pub fn generate_comment_text(run: &RunSummary, ctx: &ReportContext) -> String {
    let footer = generate_footer(ctx);

    let sections: Vec<String> = Origin::ALL
        .into_iter()
        .map(|origin| generate_origin_section(run, origin, ctx))
        .collect();
    let text = format!("{}<br><br>\n\n{}", sections.join("<br><br>\n\n"), footer);

    if text.chars().count() <= ctx.max_text_chars {
        text
    } else {
        tracing::warn!(
            "Rendered comment is {} characters (limit {}), using fallback text",
            text.chars().count(),
            ctx.max_text_chars
        );
        format!("{}<br><br>\n\n{}", generate_too_many_results(ctx), footer)
    }
}

/// Section heading for an origin, e.g. `SDK-related validation Errors / Warnings`.
fn origin_title(origin: Origin) -> String {
    format!("{}-related validation Errors / Warnings", origin.label())
}

fn contact_for(origin: Origin, ctx: &ReportContext) -> &Contact {
    match origin {
        Origin::Sdk => &ctx.sdk_contact,
        Origin::Arm => &ctx.arm_contact,
    }
}

fn contact_link(contact: &Contact) -> String {
    format!("[{}](mailto:{})", contact.name, contact.email)
}

/// Generate one origin's section over every file of the run.
fn generate_origin_section(run: &RunSummary, origin: Origin, ctx: &ReportContext) -> String {
    let title = origin_title(origin);
    let contact_message = format!(
        "These errors are reported by the {} team's validation tools, reach out to {} directly for any questions or concerns.",
        origin.label(),
        contact_link(contact_for(origin, ctx))
    );

    let file_sections: String = run
        .files
        .values()
        .map(|report| generate_file_section(report, origin, ctx))
        .collect();

    let body = if file_sections.is_empty() {
        format!("**There were no files containing {}.**", title)
    } else {
        file_sections
    };

    format!("# Linter results for {}\n{}\n\n{}", title, contact_message, body)
}

/// Generate a file's blocks for one origin; empty when it has no findings.
pub fn generate_file_section(report: &FileReport, origin: Origin, ctx: &ReportContext) -> String {
    if !report.has_issues_for(origin) {
        return String::new();
    }

    let errors = Bucket::new(origin, Severity::Error);
    let warnings = Bucket::new(origin, Severity::Warning);

    let mut section = generate_bucket_blocks(errors, report.partition(errors), ctx);
    if !section.is_empty() {
        section.push_str("<br>\n\n");
    }
    section.push_str(&generate_bucket_blocks(warnings, report.partition(warnings), ctx));

    format!(
        "## Config file: [{}]({})\n{}",
        report.name,
        ctx.blob_href(&report.name),
        section
    )
}

/// New block (expanded) followed by existing block (collapsed).
fn generate_bucket_blocks(bucket: Bucket, partition: &Partition, ctx: &ReportContext) -> String {
    let mut blocks = String::new();

    if !partition.new.is_empty() {
        blocks.push_str(&format!(
            "<details open><summary><h3 style=\"display: inline\"><a name=\"{}\"></a>{} {} new {}</h3></summary><br>\n\n{}\n</details>\n\n",
            bucket.anchor(),
            bucket.severity.icon(),
            partition.new.len(),
            pluralize(&bucket.label(), partition.new.len()),
            generate_issue_table(&partition.new, ctx)
        ));
    }

    if !partition.existing.is_empty() {
        blocks.push_str(&format!(
            "<details><summary>{} {} existing {}</summary><br>\n\n{}\n</details>\n\n",
            bucket.severity.icon(),
            partition.existing.len(),
            pluralize(&bucket.label(), partition.existing.len()),
            generate_issue_table(&partition.existing, ctx)
        ));
    }

    blocks
}

/// Numbered markdown table of findings in display order.
pub fn generate_issue_table(issues: &[Issue], ctx: &ReportContext) -> String {
    let mut table = TABLE_HEADER.to_string();

    for (index, issue) in sort_for_display(issues).into_iter().enumerate() {
        table.push_str(&generate_issue_row(index + 1, issue, ctx));
    }

    table
}

/// A single table row.
fn generate_issue_row(count: usize, issue: &Issue, ctx: &ReportContext) -> String {
    let icon = match issue.level {
        IssueLevel::Error => Severity::Error.icon(),
        _ => Severity::Warning.icon(),
    };

    format!(
        "|{}|{}|[{} - {}]({})|[{}:{}]({}#L{} \"{}\")|{}|\n",
        count,
        icon,
        issue.id(),
        issue.code(),
        ctx.doc_url(issue.id()),
        short_name(&issue.file_path),
        issue.line_number,
        ctx.blob_href(&issue.file_path),
        issue.line_number,
        issue.file_path,
        escape_cell(issue.message())
    )
}

/// `parent/&#8203;<strong>file</strong>` label for a document path.
pub fn short_name(file_path: &str) -> String {
    let path = std::path::Path::new(file_path);
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = path
        .parent()
        .and_then(|parent| parent.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string());

    format!("{}/&#8203;<strong>{}</strong>", parent, file)
}

/// Keep a message inside its table cell.
fn escape_cell(message: &str) -> String {
    message
        .replace('"', "'")
        .replace('|', "\\|")
        .replace(['\r', '\n'], " ")
}

/// `<a href='mailto:...'>title</a>` with an encoded subject and body.
pub fn email_link(title: &str, address: &str, subject: &str, body: &str) -> String {
    let mut link = format!("<a href='mailto:{}", address);
    let mut separator = '?';

    if !subject.is_empty() {
        link.push_str(&format!("{}subject={}", separator, encode_component(subject)));
        separator = '&';
    }
    if !body.is_empty() {
        link.push_str(&format!("{}body={}", separator, encode_component(body)));
    }
    link.push_str(&format!("'>{}</a>", title));

    link
}

/// Percent-encode for a mailto query; spaces become `%20`, not `+`.
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Generate the comment footer.
pub fn generate_footer(ctx: &ReportContext) -> String {
    format!(
        "[Linter Guidelines]({}) | [Linter Issues]({}) | Send {}\n\nThanks for your co-operation.",
        ctx.guidelines_url,
        ctx.issues_url,
        email_link(
            "feedback",
            &ctx.feedback_email,
            "Feedback | Linter Diff Tool",
            ""
        )
    )
}

/// Fallback body used when the full comment exceeds the size limit.
fn generate_too_many_results(ctx: &ReportContext) -> String {
    format!(
        "# Result limit exceeded, check build output\n\
         The linter diff produced too many results to display here. Please view the build output to see the results. \
         For help with {}, reach out to {}. For help with {}, reach out to {}.\n\n\
         ### [View Build Output]({})",
        origin_title(Origin::Sdk),
        contact_link(&ctx.sdk_contact),
        origin_title(Origin::Arm),
        contact_link(&ctx.arm_contact),
        ctx.build_url()
    )
}
