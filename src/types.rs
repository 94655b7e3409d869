//! Core types for pr-doctor
//!
//! Every record here is a read-only snapshot of what the source control host
//! reported. Raw string fields stay raw; the parsed views normalize case and
//! treat absent values as unknown rather than failing.

use chrono::{DateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Trim and lowercase an optional raw field, mapping absent to `""`.
pub fn normalize_field(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_lowercase()).unwrap_or_default()
}

/// Repository coordinates on GitHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

impl PlatformConfig {
    /// `owner/repo` slug
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

// =============================================================================
// Pull request and merge metadata
// =============================================================================

/// Merge metadata as reported by the host. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeMetadata {
    /// Raw mergeable value (`MERGEABLE`, `CONFLICTING`, `UNKNOWN`)
    #[serde(default)]
    pub mergeable: Option<String>,
    /// Raw merge state status (`CLEAN`, `DIRTY`, `BEHIND`, ...)
    #[serde(default)]
    pub merge_state_status: Option<String>,
    /// Web URL of the PR
    #[serde(default)]
    pub url: Option<String>,
    /// Base branch name
    #[serde(default)]
    pub base_ref_name: Option<String>,
    /// Head branch name
    #[serde(default)]
    pub head_ref_name: Option<String>,
}

impl MergeMetadata {
    /// Parsed mergeable tri-state
    pub fn mergeability(&self) -> Mergeability {
        Mergeability::parse(self.mergeable.as_deref())
    }

    /// Parsed merge state status
    pub fn merge_state(&self) -> MergeStateStatus {
        MergeStateStatus::parse(self.merge_state_status.as_deref())
    }
}

/// Whether the host can merge the PR without conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mergeability {
    /// No conflicts
    Mergeable,
    /// Conflicts with the base branch
    Conflicting,
    /// Not computed yet, absent, or unrecognised
    Unknown,
}

impl Mergeability {
    /// Parse a raw value, case-insensitively
    pub fn parse(raw: Option<&str>) -> Self {
        match normalize_field(raw).as_str() {
            "mergeable" => Self::Mergeable,
            "conflicting" => Self::Conflicting,
            _ => Self::Unknown,
        }
    }
}

/// Host-computed summary of the PR's merge state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStateStatus {
    /// Ready to merge
    Clean,
    /// Merge conflicts
    Dirty,
    /// Head branch is behind the base branch
    Behind,
    /// Blocked by branch protection
    Blocked,
    /// Mergeable with non-passing commit status
    Unstable,
    /// Mergeable with passing status and pre-receive hooks
    HasHooks,
    /// PR is a draft
    Draft,
    /// Not computed yet, absent, or unrecognised
    Unknown,
}

impl MergeStateStatus {
    /// Parse a raw value, case-insensitively
    pub fn parse(raw: Option<&str>) -> Self {
        match normalize_field(raw).as_str() {
            "clean" => Self::Clean,
            "dirty" => Self::Dirty,
            "behind" => Self::Behind,
            "blocked" => Self::Blocked,
            "unstable" => Self::Unstable,
            "has_hooks" => Self::HasHooks,
            "draft" => Self::Draft,
            _ => Self::Unknown,
        }
    }
}

/// A pull request snapshot, fetched once per diagnosis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Login of the PR author (empty if the account is gone)
    pub author: String,
    /// SHA of the head commit, used to look up checks
    pub head_sha: String,
    /// Merge metadata
    pub merge: MergeMetadata,
}

// =============================================================================
// Reviews and comments
// =============================================================================

/// State of a submitted review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// Reviewer approved
    Approved,
    /// Reviewer requested changes
    ChangesRequested,
    /// Reviewer left a comment-only review
    Commented,
    /// Review was dismissed
    Dismissed,
    /// Review started but not submitted
    Pending,
    /// Anything else the host reports
    #[serde(untagged)]
    Other(String),
}

impl ReviewState {
    /// Parse a raw state. Returns `None` for an empty or absent state.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let normalized = normalize_field(raw);
        let state = match normalized.as_str() {
            "" => return None,
            "approved" => Self::Approved,
            "changes_requested" => Self::ChangesRequested,
            "commented" => Self::Commented,
            "dismissed" => Self::Dismissed,
            "pending" => Self::Pending,
            _ => Self::Other(normalized.to_uppercase()),
        };
        Some(state)
    }
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "APPROVED"),
            Self::ChangesRequested => write!(f, "CHANGES_REQUESTED"),
            Self::Commented => write!(f, "COMMENTED"),
            Self::Dismissed => write!(f, "DISMISSED"),
            Self::Pending => write!(f, "PENDING"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A review on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Reviewer login
    pub author: String,
    /// Review state (`None` when the host reported no state)
    pub state: Option<ReviewState>,
    /// Submission time, ISO-8601 (may be empty)
    pub submitted_at: String,
    /// Review body
    pub body: String,
    /// Web URL of the review
    pub url: String,
}

/// An inline review comment attached to a diff line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewComment {
    /// Comment author login
    pub author: String,
    /// File path the comment is attached to
    pub path: String,
    /// Line number, if the host reported one
    pub line: Option<u64>,
    /// Creation time, ISO-8601
    pub created_at: String,
    /// Comment body
    pub body: String,
    /// Web URL of the comment
    pub url: String,
}

/// A conversation comment on the PR itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueComment {
    /// Comment author login
    pub author: String,
    /// Creation time, ISO-8601
    pub created_at: String,
    /// Comment body
    pub body: String,
    /// Web URL of the comment
    pub url: String,
}

// =============================================================================
// Checks and logs
// =============================================================================

/// A CI check attached to the PR head commit
///
/// Accepts both the rich shape (`state`, `conclusion`, `detailsUrl`) and the
/// coarse shape (`state`, `bucket`, `link`, `workflow`). `status` is read as
/// `state` and `link` as `detailsUrl`; when a record carries both names the
/// primary one wins. Every field is optional; classification never requires
/// a particular one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CheckRecord")]
pub struct CheckRun {
    /// Check name
    pub name: String,
    /// Lifecycle state (`queued`, `in_progress`, `completed`, or a status
    /// context state like `failure`)
    pub state: Option<String>,
    /// Terminal outcome of a completed check
    pub conclusion: Option<String>,
    /// Coarse outcome (`pass`, `fail`, `pending`, `skipping`)
    pub bucket: Option<String>,
    /// Details URL
    pub details_url: Option<String>,
    /// Start time, RFC 3339
    pub started_at: Option<String>,
    /// Completion time, RFC 3339
    pub completed_at: Option<String>,
    /// Workflow name
    pub workflow: Option<String>,
}

/// Wire form of [`CheckRun`], keeping alternate field names apart
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct CheckRecord {
    name: String,
    state: Option<String>,
    status: Option<String>,
    conclusion: Option<String>,
    bucket: Option<String>,
    details_url: Option<String>,
    link: Option<String>,
    started_at: Option<String>,
    completed_at: Option<String>,
    workflow: Option<String>,
}

impl From<CheckRecord> for CheckRun {
    fn from(record: CheckRecord) -> Self {
        Self {
            name: record.name,
            state: record.state.or(record.status),
            conclusion: record.conclusion,
            bucket: record.bucket,
            details_url: record.details_url.or(record.link),
            started_at: record.started_at,
            completed_at: record.completed_at,
            workflow: record.workflow,
        }
    }
}

impl CheckRun {
    /// Wall-clock duration of the check, when both timestamps parse
    pub fn elapsed(&self) -> Option<TimeDelta> {
        let started = DateTime::parse_from_rfc3339(self.started_at.as_deref()?).ok()?;
        let completed = DateTime::parse_from_rfc3339(self.completed_at.as_deref()?).ok()?;
        Some(completed - started)
    }
}

/// Workflow run metadata for a failing check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    /// Workflow run name
    #[serde(default)]
    pub name: Option<String>,
    /// Run status (`queued`, `in_progress`, `completed`)
    #[serde(default)]
    pub status: Option<String>,
    /// Run conclusion
    #[serde(default)]
    pub conclusion: Option<String>,
    /// Triggering event
    #[serde(default)]
    pub event: Option<String>,
    /// Head branch of the run
    #[serde(default)]
    pub head_branch: Option<String>,
    /// Head commit SHA of the run
    #[serde(default)]
    pub head_sha: Option<String>,
    /// Web URL of the run
    #[serde(default)]
    pub url: Option<String>,
}

/// Outcome of fetching a check's log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum LogFetchResult {
    /// Log text retrieved
    Ok(String),
    /// Log exists but is not available yet
    Pending(String),
    /// Retrieval failed for this invocation
    Error(String),
}

/// A bounded window of log lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureSnippet {
    /// Lines in log order
    pub lines: Vec<String>,
    /// Index of the first snippet line within the log
    pub start: usize,
    /// Index of the failure marker line, `None` when this is a plain tail
    pub marker_line: Option<usize>,
}

impl FailureSnippet {
    /// Whether a failure marker was found
    pub const fn has_marker(&self) -> bool {
        self.marker_line.is_some()
    }

    /// Whether the snippet holds no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
