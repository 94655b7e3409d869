//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use pr_doctor::diagnosis::LogSource;
use pr_doctor::error::{Error, Result};
use pr_doctor::platform::PlatformService;
use pr_doctor::types::{
    CheckRun, IssueComment, PlatformConfig, PullRequest, Review, ReviewComment, RunMetadata,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Canned log response: payload bytes or an error message
pub type LogResponse = std::result::Result<Vec<u8>, String>;

/// Simple mock platform service for testing
///
/// This manually implements `PlatformService` rather than using mockall,
/// because the trait is async and object-safe through `async_trait`.
///
/// Features:
/// - Configurable responses per PR, branch, run and job
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    pull_requests: Mutex<HashMap<u64, PullRequest>>,
    branch_prs: Mutex<HashMap<String, u64>>,
    checks: Mutex<Vec<CheckRun>>,
    reviews: Mutex<Vec<Review>>,
    review_comments: Mutex<Vec<ReviewComment>>,
    issue_comments: Mutex<Vec<IssueComment>>,
    run_metadata: Mutex<HashMap<u64, RunMetadata>>,
    run_logs: Mutex<HashMap<u64, LogResponse>>,
    job_logs: Mutex<HashMap<u64, LogResponse>>,
    // Call tracking
    get_pr_calls: Mutex<Vec<u64>>,
    list_checks_calls: Mutex<Vec<String>>,
    run_log_calls: Mutex<Vec<u64>>,
    job_log_calls: Mutex<Vec<u64>>,
    // Error injection
    error_on_list_checks: Mutex<Option<String>>,
    error_on_list_reviews: Mutex<Option<String>>,
    error_on_list_review_comments: Mutex<Option<String>>,
    error_on_list_issue_comments: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            pull_requests: Mutex::new(HashMap::new()),
            branch_prs: Mutex::new(HashMap::new()),
            checks: Mutex::new(Vec::new()),
            reviews: Mutex::new(Vec::new()),
            review_comments: Mutex::new(Vec::new()),
            issue_comments: Mutex::new(Vec::new()),
            run_metadata: Mutex::new(HashMap::new()),
            run_logs: Mutex::new(HashMap::new()),
            job_logs: Mutex::new(HashMap::new()),
            get_pr_calls: Mutex::new(Vec::new()),
            list_checks_calls: Mutex::new(Vec::new()),
            run_log_calls: Mutex::new(Vec::new()),
            job_log_calls: Mutex::new(Vec::new()),
            error_on_list_checks: Mutex::new(None),
            error_on_list_reviews: Mutex::new(None),
            error_on_list_review_comments: Mutex::new(None),
            error_on_list_issue_comments: Mutex::new(None),
        }
    }

    // === Response setup ===

    /// Register a PR snapshot
    pub fn set_pull_request(&self, pr: PullRequest) {
        self.pull_requests.lock().unwrap().insert(pr.number, pr);
    }

    /// Map a branch to an open PR
    pub fn set_branch_pr(&self, branch: &str, pr_number: u64) {
        self.branch_prs
            .lock()
            .unwrap()
            .insert(branch.to_string(), pr_number);
    }

    /// Set the checks returned for any head SHA
    pub fn set_checks(&self, checks: Vec<CheckRun>) {
        *self.checks.lock().unwrap() = checks;
    }

    /// Set the reviews returned for any PR
    pub fn set_reviews(&self, reviews: Vec<Review>) {
        *self.reviews.lock().unwrap() = reviews;
    }

    /// Set the inline review comments returned for any PR
    pub fn set_review_comments(&self, comments: Vec<ReviewComment>) {
        *self.review_comments.lock().unwrap() = comments;
    }

    /// Set the issue comments returned for any PR
    pub fn set_issue_comments(&self, comments: Vec<IssueComment>) {
        *self.issue_comments.lock().unwrap() = comments;
    }

    /// Set metadata for a workflow run
    pub fn set_run_metadata(&self, run_id: u64, meta: RunMetadata) {
        self.run_metadata.lock().unwrap().insert(run_id, meta);
    }

    /// Set the run-level log response
    pub fn set_run_log(&self, run_id: u64, response: LogResponse) {
        self.run_logs.lock().unwrap().insert(run_id, response);
    }

    /// Set the job-level log response
    pub fn set_job_log(&self, job_id: u64, response: LogResponse) {
        self.job_logs.lock().unwrap().insert(job_id, response);
    }

    // === Error injection methods ===

    /// Make `list_checks` return an error
    pub fn fail_list_checks(&self, msg: &str) {
        *self.error_on_list_checks.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_reviews` return an error
    pub fn fail_list_reviews(&self, msg: &str) {
        *self.error_on_list_reviews.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_review_comments` return an error
    pub fn fail_list_review_comments(&self, msg: &str) {
        *self.error_on_list_review_comments.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_issue_comments` return an error
    pub fn fail_list_issue_comments(&self, msg: &str) {
        *self.error_on_list_issue_comments.lock().unwrap() = Some(msg.to_string());
    }

    // === Call inspection ===

    /// PR numbers passed to `get_pull_request`
    pub fn get_pr_calls(&self) -> Vec<u64> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    /// Head SHAs passed to `list_checks`
    pub fn list_checks_calls(&self) -> Vec<String> {
        self.list_checks_calls.lock().unwrap().clone()
    }

    /// Run ids whose log was requested
    pub fn run_log_calls(&self) -> Vec<u64> {
        self.run_log_calls.lock().unwrap().clone()
    }

    /// Job ids whose log was requested
    pub fn job_log_calls(&self) -> Vec<u64> {
        self.job_log_calls.lock().unwrap().clone()
    }

    fn injected(slot: &Mutex<Option<String>>) -> Result<()> {
        slot.lock()
            .unwrap()
            .clone()
            .map_or(Ok(()), |msg| Err(Error::Platform(msg)))
    }

    fn log_response(map: &Mutex<HashMap<u64, LogResponse>>, id: u64, kind: &str) -> Result<Vec<u8>> {
        map.lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Err(format!("no {kind} log for {id}")))
            .map_err(Error::Platform)
    }
}

#[async_trait]
impl LogSource for MockPlatformService {
    async fn fetch_run_log(&self, run_id: u64) -> Result<Vec<u8>> {
        self.run_log_calls.lock().unwrap().push(run_id);
        Self::log_response(&self.run_logs, run_id, "run")
    }

    async fn fetch_job_log(&self, job_id: u64) -> Result<Vec<u8>> {
        self.job_log_calls.lock().unwrap().push(job_id);
        Self::log_response(&self.job_logs, job_id, "job")
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    async fn find_pr_for_branch(&self, branch: &str) -> Result<Option<u64>> {
        Ok(self.branch_prs.lock().unwrap().get(branch).copied())
    }

    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequest> {
        self.get_pr_calls.lock().unwrap().push(pr_number);
        self.pull_requests
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| Error::PrNotFound(format!("#{pr_number}")))
    }

    async fn list_checks(&self, head_sha: &str) -> Result<Vec<CheckRun>> {
        self.list_checks_calls
            .lock()
            .unwrap()
            .push(head_sha.to_string());
        Self::injected(&self.error_on_list_checks)?;
        Ok(self.checks.lock().unwrap().clone())
    }

    async fn list_reviews(&self, _pr_number: u64) -> Result<Vec<Review>> {
        Self::injected(&self.error_on_list_reviews)?;
        Ok(self.reviews.lock().unwrap().clone())
    }

    async fn list_review_comments(&self, _pr_number: u64) -> Result<Vec<ReviewComment>> {
        Self::injected(&self.error_on_list_review_comments)?;
        Ok(self.review_comments.lock().unwrap().clone())
    }

    async fn list_issue_comments(&self, _pr_number: u64) -> Result<Vec<IssueComment>> {
        Self::injected(&self.error_on_list_issue_comments)?;
        Ok(self.issue_comments.lock().unwrap().clone())
    }

    async fn get_run_metadata(&self, run_id: u64) -> Result<RunMetadata> {
        self.run_metadata
            .lock()
            .unwrap()
            .get(&run_id)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("no run {run_id}")))
    }
}
