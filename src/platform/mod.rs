//! Source control host services
//!
//! Provides the data the diagnosis engine consumes: the PR snapshot,
//! reviewer feedback, check records and CI logs.

mod detection;
mod factory;
mod github;

pub use detection::{extract_pr_number, parse_repo_info};
pub use factory::create_platform_service;
pub use github::GitHubService;

use crate::diagnosis::LogSource;
use crate::error::Result;
use crate::types::{
    CheckRun, IssueComment, PlatformConfig, PullRequest, Review, ReviewComment, RunMetadata,
};
use async_trait::async_trait;

/// Platform service trait for PR diagnosis
///
/// Log retrieval comes from the [`LogSource`] supertrait so the same
/// service can be handed straight to a `LogRetriever`.
#[async_trait]
pub trait PlatformService: LogSource {
    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;

    /// Find the open PR whose head is `branch`
    async fn find_pr_for_branch(&self, branch: &str) -> Result<Option<u64>>;

    /// Fetch the PR snapshot including merge metadata
    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequest>;

    /// List checks reported for a commit
    async fn list_checks(&self, head_sha: &str) -> Result<Vec<CheckRun>>;

    /// List reviews on a PR (first page of 100)
    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<Review>>;

    /// List inline review comments on a PR (first page of 100)
    async fn list_review_comments(&self, pr_number: u64) -> Result<Vec<ReviewComment>>;

    /// List conversation comments on a PR (first page of 100)
    async fn list_issue_comments(&self, pr_number: u64) -> Result<Vec<IssueComment>>;

    /// Fetch workflow run metadata
    async fn get_run_metadata(&self, run_id: u64) -> Result<RunMetadata>;
}
