//! lintdiff - before/after linter findings comparison
//!
//! A CLI tool that reads the linter findings of every file changed by a
//! pull request, decides which findings the change introduced, and renders
//! them as a PR comment, a console report and a structured pipeline log.
//!
//! Exit codes:
//!   0 - Success (no new errors)
//!   1 - Runtime error (unreadable input, config, I/O, etc.)
//!   2 - The change introduced new errors

mod analysis;
mod cli;
mod config;
mod input;
mod models;
mod pipeline;
mod publish;
mod reference;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use pipeline::{records_for_file, PipeLog};
use report::{RenderedReport, ReportContext};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Configuration decides the default verbosity, so it is read before logging starts
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("lintdiff v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Comparison failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .lintdiff.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize links, contacts, and the pipe log location.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref config_path) => Config::load(config_path)?,
        None => Config::load_default()?.unwrap_or_default(),
    };

    config.merge_with_args(args);
    Ok(config)
}

/// Run the comparison workflow. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let ctx = ReportContext::new(&config, &args);
    let input_path = args.input_path(&config);
    info!("Reading diff results from {}", input_path.display());

    let diff = match input::load_diff_input(&input_path) {
        Ok(diff) => diff,
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            let failure = report::failure_report(&ctx);
            emit_output(&failure, args.output.as_deref())?;
            return Ok(1);
        }
    };

    let run = analysis::aggregate(&diff);
    info!(
        "Compared {} files: {} new errors, {} new warnings",
        run.files.len(),
        run.counts.total_errors(),
        run.counts.total_warnings()
    );

    println!("{}", report::plain::generate_plain_report(&run));

    // The rendered report and exit status do not depend on the pipe log
    let pipe_log = PipeLog::new(&config.general.pipe_log);
    match write_pipe_log(&pipe_log, &run, &ctx) {
        Ok(()) => debug!("Pipe log written to {}", pipe_log.path().display()),
        Err(e) => warn!("Failed to write pipe log: {:#}", e),
    }

    let rendered = report::render(&run, &ctx);
    emit_output(&rendered, args.output.as_deref())?;

    if args.post_comment {
        publish_comment(&args, &config, &rendered.text).await;
    }

    if run.has_new_errors() {
        warn!("The change introduces {} new errors", run.counts.total_errors());
        return Ok(2);
    }

    Ok(0)
}

/// Append every file's records, stamped with one run time.
fn write_pipe_log(pipe_log: &PipeLog, run: &models::RunSummary, ctx: &ReportContext) -> Result<()> {
    let time = Utc::now();
    for file_report in run.files.values() {
        pipe_log.append(&records_for_file(file_report, ctx, time))?;
    }
    Ok(())
}

/// Print the rendered report between output markers and optionally save it.
fn emit_output(rendered: &RenderedReport, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(rendered).context("Failed to serialize report")?;

    println!("---output");
    println!("{}", json);
    println!("---");

    if let Some(path) = output {
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report saved to {}", path.display());
    }

    Ok(())
}

/// Post the comment text; failures only warn.
async fn publish_comment(args: &Args, config: &Config, body: &str) {
    let target = args
        .repo_slug
        .as_deref()
        .zip(args.pr_number())
        .and_then(|(slug, pr)| publish::CommentTarget::from_slug(slug, pr));
    let (Some(target), Some(token)) = (target, args.github_token.as_deref()) else {
        warn!("Skipping comment: repository slug, pull request or token missing");
        return;
    };

    match publish::post_comment(&target, body, token, &config.publish).await {
        Ok(url) => info!("Comment posted: {}", url),
        Err(e) => warn!("Failed to post comment: {:#}", e),
    }
}
