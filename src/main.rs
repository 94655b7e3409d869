//! pr-doctor CLI

mod cli;

use clap::Parser;
use cli::style::Stylize;
use cli::{DiagnoseOptions, run_diagnose};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pr-doctor")]
#[command(about = "Diagnose why a pull request is not mergeable")]
#[command(
    long_about = "Diagnose why a pull request is not mergeable.\n\n\
    Reports merge conflicts, a branch behind its base, reviewer feedback \
    and failing CI checks with a snippet of the failing log.\n\n\
    Exits with status 1 when anything blocks the merge."
)]
#[command(version)]
struct Cli {
    /// Path inside the local repository
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Git remote identifying the repository
    #[arg(long, default_value = "origin")]
    remote: String,

    /// Repository as OWNER/NAME, overriding the remote
    #[arg(long)]
    repo: Option<String>,

    /// PR number, PR URL or branch name (default: current branch)
    #[arg(long)]
    pr: Option<String>,

    /// Maximum lines in a failure snippet
    #[arg(long)]
    max_lines: Option<usize>,

    /// Context lines around the failure marker
    #[arg(long)]
    context: Option<usize>,

    /// Maximum reviews and comments listed per section
    #[arg(long)]
    max_review_comments: Option<usize>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pr_doctor=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = DiagnoseOptions {
        path: cli.path,
        remote: cli.remote,
        repo: cli.repo,
        pr: cli.pr,
        max_lines: cli.max_lines,
        context: cli.context,
        max_review_comments: cli.max_review_comments,
        json: cli.json,
    };

    match run_diagnose(options).await {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::FAILURE,
        Err(e) => {
            anstream::eprintln!("{} {e}", "Error:".error());
            ExitCode::FAILURE
        }
    }
}
