//! Diagnosis engine
//!
//! Three-phase pattern:
//! 1. Gather - fetch the PR snapshot, feedback and checks (effectful)
//! 2. Classify - merge state, review decision, failing checks (pure)
//! 3. Retrieve - fetch and trim the log of each failing check (effectful)
//!
//! Checks are analyzed one at a time in the order the host returned them.
//! Only a PR that cannot be fetched aborts the run; every other failure is
//! recorded on the finding it belongs to.

pub mod checks;
pub mod logs;
pub mod merge_state;
pub mod report;
pub mod review;
pub mod snippet;

pub use checks::{extract_job_id, extract_run_id, failing_checks, is_failing};
pub use logs::{LogRetriever, LogSource, PENDING_LOG_MARKERS};
pub use merge_state::classify_merge_state;
pub use report::{
    CheckFinding, CheckStatus, Diagnosis, Finding, ReviewCounts, ReviewDecision, ReviewFinding,
};
pub use review::{
    ReviewDisplay, ReviewInput, ReviewOutcome, build_review_finding, compact_text, reduce_reviews,
};
pub use snippet::{FAILURE_MARKERS, MarkerSet, SnippetExtractor, tail_lines};

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{CheckRun, LogFetchResult};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Default number of lines in a snippet
pub const DEFAULT_MAX_LINES: usize = 160;

/// Default number of context lines on each side of a failure marker
pub const DEFAULT_CONTEXT_LINES: usize = 30;

/// Progress reporting during a diagnosis
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called with a short human-readable status message
    async fn on_message(&self, message: &str);
}

/// Progress callback that ignores everything
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
}

/// Tunables for a diagnosis run
#[derive(Debug, Clone)]
pub struct DiagnosisOptions {
    /// Maximum lines in a snippet and in the tail
    pub max_lines: usize,
    /// Context lines around a failure marker
    pub context: usize,
    /// Review display limits
    pub review_display: ReviewDisplay,
    /// Failure marker vocabulary
    pub failure_markers: MarkerSet,
    /// Pending-log marker vocabulary
    pub pending_markers: MarkerSet,
}

impl Default for DiagnosisOptions {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            context: DEFAULT_CONTEXT_LINES,
            review_display: ReviewDisplay::default(),
            failure_markers: MarkerSet::new(FAILURE_MARKERS),
            pending_markers: MarkerSet::new(PENDING_LOG_MARKERS),
        }
    }
}

/// Diagnose one pull request
pub async fn run_diagnosis(
    platform: &dyn PlatformService,
    pr_number: u64,
    options: &DiagnosisOptions,
    progress: &dyn ProgressCallback,
) -> Result<Diagnosis> {
    progress
        .on_message(&format!("Fetching PR #{pr_number}..."))
        .await;
    let pr = platform.get_pull_request(pr_number).await?;
    debug!(pr = pr.number, author = %pr.author, head = %pr.head_sha, "fetched PR snapshot");

    let mut results = Vec::new();

    if let Some(finding) = classify_merge_state(&pr.merge) {
        results.push(finding);
    }

    progress.on_message("Fetching reviews and comments...").await;
    let (input, errors) = gather_feedback(platform, pr.number).await;
    let outcome = reduce_reviews(&input, &pr.author);
    debug!(decision = %outcome.decision, action_required = outcome.action_required, "reduced reviews");
    if let Some(finding) =
        build_review_finding(&outcome, &pr.html_url, &errors, options.review_display)
    {
        results.push(Finding::Review(finding));
    }

    progress.on_message("Fetching checks...").await;
    match platform.list_checks(&pr.head_sha).await {
        Ok(checks) => {
            let failing = failing_checks(&checks);
            debug!(total = checks.len(), failing = failing.len(), "classified checks");
            for check in failing {
                progress
                    .on_message(&format!("Fetching log for {}...", check.name))
                    .await;
                let finding = analyze_check(platform, check, options).await;
                results.push(Finding::Check(finding));
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to list checks");
            results.push(Finding::ChecksUnavailable {
                error: e.to_string(),
            });
        }
    }

    Ok(Diagnosis {
        pr: pr.number,
        url: pr.html_url,
        merge_status: pr.merge,
        results,
    })
}

/// Fetch the three feedback collections, recording failures instead of
/// propagating them
async fn gather_feedback(
    platform: &dyn PlatformService,
    pr_number: u64,
) -> (ReviewInput, Vec<String>) {
    let mut input = ReviewInput::default();
    let mut errors = Vec::new();

    match platform.list_reviews(pr_number).await {
        Ok(reviews) => input.reviews = reviews,
        Err(e) => errors.push(format!("Reviews: {e}")),
    }
    match platform.list_review_comments(pr_number).await {
        Ok(comments) => input.review_comments = comments,
        Err(e) => errors.push(format!("Review comments: {e}")),
    }
    match platform.list_issue_comments(pr_number).await {
        Ok(comments) => input.issue_comments = comments,
        Err(e) => errors.push(format!("Issue comments: {e}")),
    }

    if !errors.is_empty() {
        warn!(pr = pr_number, errors = errors.len(), "some feedback could not be fetched");
    }
    (input, errors)
}

/// Analyze one failing check: locate its run, fetch the log, extract a
/// snippet
pub async fn analyze_check(
    platform: &dyn PlatformService,
    check: &CheckRun,
    options: &DiagnosisOptions,
) -> CheckFinding {
    let url = check.details_url.clone().unwrap_or_default();
    let run_id = extract_run_id(&url);
    let job_id = extract_job_id(&url);

    let mut finding = CheckFinding {
        name: check.name.clone(),
        details_url: url,
        run_id,
        job_id,
        workflow: check.workflow.clone(),
        duration_secs: check.elapsed().map(|d| d.num_seconds()),
        status: CheckStatus::External,
        note: None,
        error: None,
        run: None,
        snippet: None,
        tail: None,
    };

    let Some(run_id) = run_id else {
        finding.note = Some("No GitHub Actions run id detected in details URL.".to_string());
        return finding;
    };

    finding.run = match platform.get_run_metadata(run_id).await {
        Ok(meta) => Some(meta),
        Err(e) => {
            debug!(run_id, error = %e, "run metadata unavailable");
            None
        }
    };

    let retriever = LogRetriever::with_markers(platform, options.pending_markers.clone());
    match retriever.fetch(run_id, job_id).await {
        LogFetchResult::Pending(reason) => {
            finding.status = CheckStatus::LogPending;
            finding.note = Some(if reason.is_empty() {
                "Logs are not available yet.".to_string()
            } else {
                reason
            });
        }
        LogFetchResult::Error(reason) => {
            finding.status = CheckStatus::LogUnavailable;
            finding.error = Some(reason);
        }
        LogFetchResult::Ok(text) => {
            let extractor = SnippetExtractor::new(options.failure_markers.clone());
            finding.status = CheckStatus::Ok;
            finding.snippet = Some(extractor.extract(&text, options.max_lines, options.context));
            finding.tail = Some(tail_lines(&text, options.max_lines));
        }
    }

    finding
}
