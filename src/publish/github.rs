//! Posting the rendered report as a pull request comment.

use crate::config::PublishConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Maximum length for error body content in error messages
const MAX_ERROR_BODY_LEN: usize = 200;

/// Pull request that receives the comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTarget {
    pub owner: String,
    pub repo: String,
    pub pull_request: u64,
}

impl CommentTarget {
    /// Build a target from an `owner/repo` slug and a PR number.
    pub fn from_slug(slug: &str, pull_request: &str) -> Option<Self> {
        let (owner, repo) = slug.trim().split_once('/')?;
        let repo = repo.trim_end_matches('/');
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            pull_request: pull_request.trim().parse().ok()?,
        })
    }

    fn comments_url(&self, api_url: &str) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            api_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.pull_request
        )
    }
}

#[derive(Serialize)]
struct CreateCommentRequest<'a> {
    body: &'a str,
}

#[derive(Deserialize)]
struct CreateCommentResponse {
    html_url: String,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    message: String,
}

/// Truncate an API error body and drop it entirely if it may hold secrets.
fn sanitize_error_body(body: &str) -> String {
    const SECRET_PATTERNS: &[&str] = &["token", "secret", "password", "credential", "bearer", "ghp_"];

    let truncated: String = if body.chars().count() > MAX_ERROR_BODY_LEN {
        format!(
            "{}... (truncated)",
            body.chars().take(MAX_ERROR_BODY_LEN).collect::<String>()
        )
    } else {
        body.to_string()
    };

    let lower = truncated.to_lowercase();
    if SECRET_PATTERNS.iter().any(|pattern| lower.contains(pattern)) {
        return "(error details redacted - may contain sensitive data)".to_string();
    }

    truncated
}

/// Post `body` as a comment on the target pull request.
///
/// Returns the URL of the created comment.
pub async fn post_comment(
    target: &CommentTarget,
    body: &str,
    token: &str,
    config: &PublishConfig,
) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .context("Failed to create HTTP client")?;

    let url = target.comments_url(&config.api_url);
    info!(
        "Posting comment to {}/{}#{}",
        target.owner, target.repo, target.pull_request
    );

    let resp = client
        .post(&url)
        .header("Accept", "application/vnd.github+json")
        .header("Authorization", format!("Bearer {}", token))
        .header("User-Agent", concat!("lintdiff/", env!("CARGO_PKG_VERSION")))
        .header("X-GitHub-Api-Version", "2022-11-28")
        .json(&CreateCommentRequest { body })
        .send()
        .await
        .context("Failed to send comment request")?;

    let status = resp.status();
    if status.is_success() {
        let comment: CreateCommentResponse = resp
            .json()
            .await
            .context("Failed to parse comment response")?;
        return Ok(comment.html_url);
    }

    let error_body = resp.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(anyhow::anyhow!("GitHub API error ({}): {}", status, api_error.message));
    }

    Err(anyhow::anyhow!(
        "GitHub API error ({}): {}",
        status,
        sanitize_error_body(&error_body)
    ))
}
