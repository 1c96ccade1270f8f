//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.lintdiff.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".lintdiff.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report rendering settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Contacts named in the rendered report.
    #[serde(default)]
    pub contacts: ContactsConfig,

    /// PR comment publishing settings.
    #[serde(default)]
    pub publish: PublishConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Append-only structured result log.
    #[serde(default = "default_pipe_log")]
    pub pipe_log: PathBuf,

    /// Directory holding `<pr-number>.json` diff documents.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            pipe_log: default_pipe_log(),
            log_dir: default_log_dir(),
            verbose: false,
        }
    }
}

fn default_pipe_log() -> PathBuf {
    PathBuf::from("pipe.log")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Longest rich text, in characters, before the fallback is used.
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Rule documentation page; rule ids are appended as anchors.
    #[serde(default = "default_guidelines_url")]
    pub guidelines_url: String,

    /// Where users report linter problems.
    #[serde(default = "default_issues_url")]
    pub issues_url: String,

    /// Address for feedback and failure reports.
    #[serde(default = "default_feedback_email")]
    pub feedback_email: String,

    /// Build output link; `{slug}` and `{job}` are substituted.
    #[serde(default = "default_build_url_template")]
    pub build_url_template: String,

    /// Repository used for file links when none is given on the command line.
    #[serde(default = "default_repo_slug")]
    pub repo_slug: String,

    /// Git ref used for file links when no commit is given.
    #[serde(default = "default_git_ref")]
    pub git_ref: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
            guidelines_url: default_guidelines_url(),
            issues_url: default_issues_url(),
            feedback_email: default_feedback_email(),
            build_url_template: default_build_url_template(),
            repo_slug: default_repo_slug(),
            git_ref: default_git_ref(),
        }
    }
}

fn default_max_text_chars() -> usize {
    65_535 // GitHub comment body limit
}

fn default_guidelines_url() -> String {
    "https://github.com/Azure/azure-rest-api-specs/blob/master/documentation/openapi-authoring-automated-guidelines.md".to_string()
}

fn default_issues_url() -> String {
    "https://github.com/Azure/azure-openapi-validator/issues".to_string()
}

fn default_feedback_email() -> String {
    "azure-swag-tooling@microsoft.com".to_string()
}

fn default_build_url_template() -> String {
    "https://travis-ci.org/{slug}/jobs/{job}".to_string()
}

fn default_repo_slug() -> String {
    "Azure/azure-rest-api-specs".to_string()
}

fn default_git_ref() -> String {
    "master".to_string()
}

/// A named mailbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

/// Review contacts per origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsConfig {
    #[serde(default = "default_sdk_contact")]
    pub sdk: Contact,

    #[serde(default = "default_arm_contact")]
    pub arm: Contact,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            sdk: default_sdk_contact(),
            arm: default_arm_contact(),
        }
    }
}

fn default_sdk_contact() -> Contact {
    Contact {
        name: "ADX Swagger Reviewers".to_string(),
        email: "adxsr@microsoft.com".to_string(),
    }
}

fn default_arm_contact() -> Contact {
    Contact {
        name: "ARM RP API Review".to_string(),
        email: "armrpapireview@microsoft.com".to_string(),
    }
}

/// PR comment publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// GitHub REST API root.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.lintdiff.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref pipe_log) = args.pipe_log {
            self.general.pipe_log = pipe_log.clone();
        }
        if let Some(ref log_dir) = args.log_dir {
            self.general.log_dir = log_dir.clone();
        }
        if let Some(max_text_chars) = args.max_text_chars {
            self.report.max_text_chars = max_text_chars;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
