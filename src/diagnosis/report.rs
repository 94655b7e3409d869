//! Findings and the aggregated diagnosis
//!
//! Each finding is self-contained: a check finding carries only the data of
//! its own check, so any finding can be serialized or rendered alone.

use crate::types::{
    FailureSnippet, IssueComment, MergeMetadata, Review, ReviewComment, RunMetadata,
};
use serde::{Deserialize, Serialize};

/// Overall reviewer decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    /// At least one reviewer's latest review requests changes
    ChangesRequested,
    /// At least one approval and no outstanding change requests
    Approved,
    /// Only comment reviews
    Commented,
    /// Reviews exist but none of the above states
    Reviewed,
    /// No reviews
    Pending,
}

impl std::fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChangesRequested => write!(f, "CHANGES_REQUESTED"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Commented => write!(f, "COMMENTED"),
            Self::Reviewed => write!(f, "REVIEWED"),
            Self::Pending => write!(f, "PENDING"),
        }
    }
}

/// Counts of surviving feedback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCounts {
    /// Submitted reviews from other people
    pub reviews: usize,
    /// Distinct reviewers
    pub reviewers: usize,
    /// Inline review comments
    pub review_comments: usize,
    /// Conversation comments
    pub issue_comments: usize,
}

/// Reviewer feedback finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFinding {
    /// PR web URL
    pub details_url: String,
    /// Reduced decision
    pub decision: ReviewDecision,
    /// Whether the author has to respond
    pub action_required: bool,
    /// Feedback counts before display truncation
    pub counts: ReviewCounts,
    /// Latest review per reviewer, newest first
    pub latest_reviews: Vec<Review>,
    /// Inline comments
    pub review_comments: Vec<ReviewComment>,
    /// Conversation comments
    pub issue_comments: Vec<IssueComment>,
    /// Truncation notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Fetch errors for any of the feedback collections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of analyzing one failing check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Log retrieved and snippet extracted
    Ok,
    /// Log not available yet
    LogPending,
    /// Log retrieval failed
    LogUnavailable,
    /// Not a GitHub Actions check; no log to fetch
    External,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::LogPending => write!(f, "log_pending"),
            Self::LogUnavailable => write!(f, "log_unavailable"),
            Self::External => write!(f, "external"),
        }
    }
}

/// Failing check finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckFinding {
    /// Check name
    pub name: String,
    /// Details URL
    pub details_url: String,
    /// Workflow run id, if the URL encodes one
    pub run_id: Option<u64>,
    /// Job id, if the URL encodes one
    pub job_id: Option<u64>,
    /// Workflow name reported with the check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    /// How long the check ran, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i64>,
    /// Retrieval status
    pub status: CheckStatus,
    /// Informational note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Retrieval error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Workflow run metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunMetadata>,
    /// Window around the failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<FailureSnippet>,
    /// Raw end of the log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<Vec<String>>,
}

/// One diagnosis finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// PR conflicts with its base branch
    MergeConflict {
        /// PR web URL
        details_url: String,
        /// Merge metadata that triggered the finding
        merge: MergeMetadata,
        /// Human-readable explanation
        note: String,
    },
    /// PR head branch is behind its base branch
    BehindBase {
        /// PR web URL
        details_url: String,
        /// Merge metadata that triggered the finding
        merge: MergeMetadata,
        /// Human-readable explanation
        note: String,
    },
    /// Reviewer feedback
    Review(ReviewFinding),
    /// The list of checks could not be fetched
    ChecksUnavailable {
        /// Transport error
        error: String,
    },
    /// A failing check
    Check(CheckFinding),
}

impl Finding {
    /// Display name of the finding
    pub fn name(&self) -> &str {
        match self {
            Self::MergeConflict { .. } => "Merge conflicts",
            Self::BehindBase { .. } => "Update branch required",
            Self::Review(_) => "Reviewer comments",
            Self::ChecksUnavailable { .. } => "CI checks",
            Self::Check(check) => &check.name,
        }
    }

    /// Whether this finding prevents merging
    pub const fn is_blocking(&self) -> bool {
        match self {
            Self::Review(review) => review.action_required,
            Self::MergeConflict { .. }
            | Self::BehindBase { .. }
            | Self::ChecksUnavailable { .. }
            | Self::Check(_) => true,
        }
    }
}

/// Result of diagnosing one pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    /// PR number
    pub pr: u64,
    /// PR web URL
    pub url: String,
    /// Merge metadata as reported
    pub merge_status: MergeMetadata,
    /// Findings, in report order
    pub results: Vec<Finding>,
}

impl Diagnosis {
    /// Whether any finding blocks the merge
    pub fn has_blocking(&self) -> bool {
        self.results.iter().any(Finding::is_blocking)
    }

    /// Failing check findings, in host order
    pub fn check_findings(&self) -> impl Iterator<Item = &CheckFinding> {
        self.results.iter().filter_map(|f| match f {
            Finding::Check(check) => Some(check),
            _ => None,
        })
    }
}
