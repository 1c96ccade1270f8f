//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values. CI metadata is read from the
//! Travis environment variables when the flags are not given.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// lintdiff - compare linter results before and after a pull request
///
/// Reads the before/after linter findings of every changed file, decides
/// which findings the pull request introduced, and renders a PR comment,
/// a console report and a structured pipeline log.
///
/// Examples:
///   lintdiff --input output/1234.json
///   lintdiff --pr-number 1234 --log-dir output --target-branch main
///   lintdiff --input diff.json --output result.json --post-comment
///   lintdiff --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Diff document with the before/after findings
    ///
    /// Defaults to `<log-dir>/<pr-number>.json`.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Directory holding `<pr-number>.json` diff documents
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Pull request number
    #[arg(long, value_name = "NUMBER", env = "TRAVIS_PULL_REQUEST")]
    pub pr_number: Option<String>,

    /// Branch the pull request targets
    #[arg(long, value_name = "BRANCH", default_value = "master", env = "TRAVIS_BRANCH")]
    pub target_branch: String,

    /// Repository slug (`owner/repo`) used for links and comment posting
    #[arg(long, value_name = "SLUG", env = "TRAVIS_REPO_SLUG")]
    pub repo_slug: Option<String>,

    /// Pull request head commit used for file links
    #[arg(long, value_name = "SHA", env = "TRAVIS_PULL_REQUEST_SHA")]
    pub commit_sha: Option<String>,

    /// CI job id used for the build output link
    #[arg(long, value_name = "ID", env = "TRAVIS_JOB_ID")]
    pub job_id: Option<String>,

    /// Structured result log to append to
    #[arg(long, value_name = "FILE")]
    pub pipe_log: Option<PathBuf>,

    /// Also write the rendered `{title, summary, text}` JSON to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .lintdiff.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Longest comment text before the fallback message is used
    #[arg(long, value_name = "CHARS")]
    pub max_text_chars: Option<usize>,

    /// Post the rendered report as a pull request comment
    #[arg(long)]
    pub post_comment: bool,

    /// Token used to post the comment
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .lintdiff.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.input.is_none() && self.pr_number().is_none() {
            return Err("Either --input or --pr-number is required".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.max_text_chars == Some(0) {
            return Err("Max text chars must be at least 1".to_string());
        }

        if self.post_comment {
            if self.github_token.as_deref().map_or(true, str::is_empty) {
                return Err("--post-comment requires --github-token or GITHUB_TOKEN".to_string());
            }
            match self.repo_slug.as_deref() {
                Some(slug) if slug.split_once('/').is_some() => {}
                _ => return Err("--post-comment requires --repo-slug in owner/repo form".to_string()),
            }
            if self.pr_number().and_then(|pr| pr.parse::<u64>().ok()).is_none() {
                return Err("--post-comment requires a numeric --pr-number".to_string());
            }
        }

        Ok(())
    }

    /// The pull request number, ignoring Travis' `false` placeholder.
    pub fn pr_number(&self) -> Option<&str> {
        self.pr_number
            .as_deref()
            .map(str::trim)
            .filter(|pr| !pr.is_empty() && *pr != "false")
    }

    /// Path of the diff document to read.
    pub fn input_path(&self, config: &Config) -> PathBuf {
        match self.input {
            Some(ref input) => input.clone(),
            None => config
                .general
                .log_dir
                .join(format!("{}.json", self.pr_number().unwrap_or_default())),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
