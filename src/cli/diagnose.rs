//! Diagnose command - explain why a pull request is not mergeable

use super::CliProgress;
use super::context::CommandContext;
use super::render::{render_json, render_text};
use pr_doctor::config::load_config;
use pr_doctor::diagnosis::run_diagnosis;
use pr_doctor::error::Result;
use std::path::PathBuf;
use tracing::debug;

/// Options for the diagnose command
#[derive(Debug, Clone, Default)]
pub struct DiagnoseOptions {
    /// Path inside the local repository
    pub path: PathBuf,
    /// Remote used to identify the repository
    pub remote: String,
    /// Explicit `OWNER/NAME` overriding the remote
    pub repo: Option<String>,
    /// PR number, URL or branch
    pub pr: Option<String>,
    /// Snippet line budget override
    pub max_lines: Option<usize>,
    /// Context line override
    pub context: Option<usize>,
    /// Review list length override
    pub max_review_comments: Option<usize>,
    /// Emit JSON instead of text
    pub json: bool,
}

/// Run the diagnose command
///
/// Returns whether any blocking finding was reported.
pub async fn run_diagnose(options: DiagnoseOptions) -> Result<bool> {
    let mut config = load_config()?;
    if let Some(max_lines) = options.max_lines {
        config.max_lines = max_lines;
    }
    if let Some(context) = options.context {
        config.context = context;
    }
    if let Some(max_review_comments) = options.max_review_comments {
        config.max_review_comments = max_review_comments;
    }
    let diagnosis_options = config.diagnosis_options();
    debug!(?diagnosis_options, "effective options");

    let ctx = CommandContext::new(&options.path, &options.remote, options.repo.as_deref()).await?;
    let pr_number = ctx.resolve_pr(options.pr.as_deref()).await?;

    let progress = CliProgress::spinner();
    let result = run_diagnosis(
        ctx.platform.as_ref(),
        pr_number,
        &diagnosis_options,
        &progress,
    )
    .await;
    progress.finish();
    let diagnosis = result?;

    if options.json {
        anstream::println!("{}", render_json(&diagnosis)?);
    } else {
        anstream::print!("{}", render_text(&diagnosis));
    }

    Ok(diagnosis.has_blocking())
}
