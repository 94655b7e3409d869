//! GitHub platform service implementation

use crate::diagnosis::LogSource;
use crate::diagnosis::logs::is_archive;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    CheckRun, IssueComment, MergeMetadata, PlatformConfig, PullRequest, Review, ReviewComment,
    ReviewState, RunMetadata,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

const PUBLIC_API: &str = "https://api.github.com";

// GraphQL response types for the PR snapshot query

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct PullRequestQueryData {
    repository: Option<GraphQlRepository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRepository {
    pull_request: Option<GraphQlPullRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlPullRequest {
    number: u64,
    url: String,
    #[serde(default)]
    head_ref_oid: String,
    mergeable: Option<String>,
    merge_state_status: Option<String>,
    base_ref_name: Option<String>,
    head_ref_name: Option<String>,
    author: Option<RawUser>,
}

impl From<GraphQlPullRequest> for PullRequest {
    fn from(pr: GraphQlPullRequest) -> Self {
        Self {
            number: pr.number,
            html_url: pr.url.clone(),
            author: pr.author.map(|a| a.login).unwrap_or_default(),
            head_sha: pr.head_ref_oid,
            merge: MergeMetadata {
                mergeable: pr.mergeable,
                merge_state_status: pr.merge_state_status,
                url: Some(pr.url),
                base_ref_name: pr.base_ref_name,
                head_ref_name: pr.head_ref_name,
            },
        }
    }
}

const PULL_REQUEST_QUERY: &str = r"
    query PullRequestSnapshot($owner: String!, $repo: String!, $number: Int!) {
        repository(owner: $owner, name: $repo) {
            pullRequest(number: $number) {
                number
                url
                headRefOid
                mergeable
                mergeStateStatus
                baseRefName
                headRefName
                author { login }
            }
        }
    }
";

// REST response types. Every field is optional so a shape change degrades
// to missing data instead of a parse failure.

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawUser {
    login: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawReview {
    user: Option<RawUser>,
    state: Option<String>,
    submitted_at: Option<String>,
    body: Option<String>,
    html_url: Option<String>,
}

impl From<RawReview> for Review {
    fn from(r: RawReview) -> Self {
        Self {
            author: r.user.map(|u| u.login).unwrap_or_default(),
            state: ReviewState::parse(r.state.as_deref()),
            submitted_at: r.submitted_at.unwrap_or_default(),
            body: r.body.unwrap_or_default(),
            url: r.html_url.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawReviewComment {
    user: Option<RawUser>,
    path: Option<String>,
    line: Option<u64>,
    original_line: Option<u64>,
    position: Option<u64>,
    created_at: Option<String>,
    body: Option<String>,
    html_url: Option<String>,
}

impl From<RawReviewComment> for ReviewComment {
    fn from(c: RawReviewComment) -> Self {
        Self {
            author: c.user.map(|u| u.login).unwrap_or_default(),
            path: c.path.unwrap_or_default(),
            line: c.line.or(c.original_line).or(c.position),
            created_at: c.created_at.unwrap_or_default(),
            body: c.body.unwrap_or_default(),
            url: c.html_url.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawIssueComment {
    user: Option<RawUser>,
    created_at: Option<String>,
    body: Option<String>,
    html_url: Option<String>,
}

impl From<RawIssueComment> for IssueComment {
    fn from(c: RawIssueComment) -> Self {
        Self {
            author: c.user.map(|u| u.login).unwrap_or_default(),
            created_at: c.created_at.unwrap_or_default(),
            body: c.body.unwrap_or_default(),
            url: c.html_url.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawCheckRun {
    name: String,
    status: Option<String>,
    conclusion: Option<String>,
    details_url: Option<String>,
    html_url: Option<String>,
    started_at: Option<String>,
    completed_at: Option<String>,
}

impl From<RawCheckRun> for CheckRun {
    fn from(run: RawCheckRun) -> Self {
        Self {
            name: run.name,
            state: run.status,
            conclusion: run.conclusion,
            bucket: None,
            details_url: run.details_url.or(run.html_url),
            started_at: run.started_at,
            completed_at: run.completed_at,
            workflow: None,
        }
    }
}

/// Legacy commit status, mapped onto the coarse check shape
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawStatus {
    context: String,
    state: Option<String>,
    target_url: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl From<RawStatus> for CheckRun {
    fn from(status: RawStatus) -> Self {
        Self {
            name: status.context,
            state: status.state,
            conclusion: None,
            bucket: None,
            details_url: status.target_url,
            started_at: status.created_at,
            completed_at: status.updated_at,
            workflow: None,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawRun {
    name: Option<String>,
    status: Option<String>,
    conclusion: Option<String>,
    event: Option<String>,
    head_branch: Option<String>,
    head_sha: Option<String>,
    html_url: Option<String>,
}

impl RawRun {
    fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }
}

impl From<RawRun> for RunMetadata {
    fn from(run: RawRun) -> Self {
        Self {
            name: run.name,
            status: run.status,
            conclusion: run.conclusion,
            event: run.event,
            head_branch: run.head_branch,
            head_sha: run.head_sha,
            url: run.html_url,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawJob {
    id: u64,
    name: String,
    status: Option<String>,
    conclusion: Option<String>,
}

impl RawJob {
    fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }

    fn failed(&self) -> bool {
        matches!(
            self.conclusion.as_deref(),
            Some("failure" | "cancelled" | "timed_out")
        )
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawJobs {
    jobs: Vec<RawJob>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawCheckRuns {
    check_runs: Vec<serde_json::Value>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawCombinedStatus {
    statuses: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Message used when a log is not materialized yet
fn pending_message(kind: &str, id: u64) -> String {
    format!("{kind} {id} is still in progress; log will be available when it is complete")
}

/// Deserialize array entries one by one, skipping malformed ones
fn lenient_items<T: DeserializeOwned, U: From<T>>(values: Vec<serde_json::Value>) -> Vec<U> {
    values
        .into_iter()
        .filter_map(|v| serde_json::from_value::<T>(v).ok())
        .map(U::from)
        .collect()
}

/// GitHub service using octocrab for GraphQL/PR lookup and reqwest for REST
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API base URL for raw requests, without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, config: PlatformConfig) -> Result<Self> {
        let api_base = config
            .host
            .as_ref()
            .map_or_else(|| PUBLIC_API.to_string(), |h| format!("https://{h}/api/v3"));
        Self::with_api_base(token, config, &api_base)
    }

    /// Create a service against an explicit API base URL
    pub fn with_api_base(token: &str, config: PlatformConfig, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("pr-doctor")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    fn repo_path(&self, rest: &str) -> String {
        format!("/repos/{}/{}{rest}", self.config.owner, self.config.repo)
    }

    /// GET a repository-relative path, failing on non-success status
    async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.api_base, self.repo_path(path));
        debug!(%url, "GET");

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("GET {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map_or(body, |b| b.message);
            return Err(Error::GitHubApi(format!(
                "GET {path} returned {status}: {message}"
            )));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path)
            .await?
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("unexpected response from {path}: {e}")))
    }

    async fn get_items<T: DeserializeOwned, U: From<T>>(&self, path: &str) -> Result<Vec<U>> {
        let values: Vec<serde_json::Value> = self.get_json(path).await?;
        Ok(lenient_items::<T, U>(values))
    }

    async fn get_run(&self, run_id: u64) -> Result<RawRun> {
        self.get_json(&format!("/actions/runs/{run_id}")).await
    }

    async fn download_job_log(&self, job_id: u64) -> Result<Vec<u8>> {
        let bytes = self
            .get(&format!("/actions/jobs/{job_id}/logs"))
            .await?
            .bytes()
            .await
            .map_err(|e| Error::GitHubApi(format!("failed to read job {job_id} log: {e}")))?;
        Ok(bytes.to_vec())
    }

    /// Legacy commit statuses; a failure here only means none are reported
    async fn list_commit_statuses(&self, head_sha: &str) -> Vec<CheckRun> {
        match self
            .get_json::<RawCombinedStatus>(&format!("/commits/{head_sha}/status"))
            .await
        {
            Ok(combined) => lenient_items::<RawStatus, CheckRun>(combined.statuses),
            Err(e) => {
                debug!(error = %e, "commit statuses unavailable, assuming none");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl LogSource for GitHubService {
    async fn fetch_run_log(&self, run_id: u64) -> Result<Vec<u8>> {
        debug!(run_id, "fetching run log");
        let run = self.get_run(run_id).await?;
        if !run.is_completed() {
            return Err(Error::GitHubApi(pending_message("run", run_id)));
        }

        let jobs: RawJobs = self
            .get_json(&format!("/actions/runs/{run_id}/jobs?per_page=100"))
            .await?;
        let failed: Vec<&RawJob> = jobs.jobs.iter().filter(|j| j.failed()).collect();
        let selected = if failed.is_empty() {
            jobs.jobs.iter().collect()
        } else {
            failed
        };

        let mut log = Vec::new();
        for job in selected {
            let payload = self.download_job_log(job.id).await?;
            if is_archive(&payload) {
                return Ok(payload);
            }
            log.extend_from_slice(format!("=== {} ===\n", job.name).as_bytes());
            log.extend_from_slice(&payload);
            if !payload.ends_with(b"\n") {
                log.push(b'\n');
            }
        }
        debug!(run_id, bytes = log.len(), "fetched run log");
        Ok(log)
    }

    async fn fetch_job_log(&self, job_id: u64) -> Result<Vec<u8>> {
        debug!(job_id, "fetching job log");
        let job: RawJob = self.get_json(&format!("/actions/jobs/{job_id}")).await?;
        if !job.is_completed() {
            return Err(Error::GitHubApi(pending_message("job", job_id)));
        }
        self.download_job_log(job_id).await
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    async fn find_pr_for_branch(&self, branch: &str) -> Result<Option<u64>> {
        debug!(branch, "finding open PR for branch");
        let head = format!("{}:{}", &self.config.owner, branch);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        let result = prs.items.first().map(|pr| pr.number);
        debug!(branch, pr_number = ?result, "branch lookup done");
        Ok(result)
    }

    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequest> {
        debug!(pr_number, "fetching PR snapshot");
        let response: GraphQlResponse<PullRequestQueryData> = self
            .client
            .graphql(&serde_json::json!({
                "query": PULL_REQUEST_QUERY,
                "variables": {
                    "owner": self.config.owner,
                    "repo": self.config.repo,
                    "number": pr_number,
                }
            }))
            .await
            .map_err(|e| Error::GitHubApi(format!("GraphQL query failed: {e}")))?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::PrNotFound(format!(
                "#{pr_number}: {}",
                messages.join(", ")
            )));
        }

        let pr = response
            .data
            .and_then(|d| d.repository)
            .and_then(|r| r.pull_request)
            .ok_or_else(|| {
                Error::PrNotFound(format!("#{pr_number} in {}", self.config.slug()))
            })?;

        debug!(pr_number, mergeable = ?pr.mergeable, state = ?pr.merge_state_status, "fetched PR snapshot");
        Ok(pr.into())
    }

    async fn list_checks(&self, head_sha: &str) -> Result<Vec<CheckRun>> {
        debug!(head_sha, "listing checks");
        let runs: RawCheckRuns = self
            .get_json(&format!("/commits/{head_sha}/check-runs?per_page=100"))
            .await?;

        let mut checks: Vec<CheckRun> = lenient_items::<RawCheckRun, CheckRun>(runs.check_runs);
        checks.extend(self.list_commit_statuses(head_sha).await);

        debug!(head_sha, count = checks.len(), "listed checks");
        Ok(checks)
    }

    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<Review>> {
        debug!(pr_number, "listing reviews");
        self.get_items::<RawReview, Review>(&format!("/pulls/{pr_number}/reviews?per_page=100"))
            .await
    }

    async fn list_review_comments(&self, pr_number: u64) -> Result<Vec<ReviewComment>> {
        debug!(pr_number, "listing review comments");
        self.get_items::<RawReviewComment, ReviewComment>(&format!(
            "/pulls/{pr_number}/comments?per_page=100"
        ))
        .await
    }

    async fn list_issue_comments(&self, pr_number: u64) -> Result<Vec<IssueComment>> {
        debug!(pr_number, "listing issue comments");
        self.get_items::<RawIssueComment, IssueComment>(&format!(
            "/issues/{pr_number}/comments?per_page=100"
        ))
        .await
    }

    async fn get_run_metadata(&self, run_id: u64) -> Result<RunMetadata> {
        debug!(run_id, "fetching run metadata");
        Ok(self.get_run(run_id).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_items_skips_malformed_entries() {
        let values = vec![
            serde_json::json!({"user": {"login": "alice"}, "state": "APPROVED"}),
            serde_json::json!("not an object"),
            serde_json::json!({"user": null, "state": null}),
        ];
        let reviews: Vec<Review> = lenient_items::<RawReview, Review>(values);
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].author, "alice");
        assert_eq!(reviews[0].state, Some(ReviewState::Approved));
        assert_eq!(reviews[1].author, "");
        assert_eq!(reviews[1].state, None);
    }

    #[test]
    fn test_review_comment_line_fallbacks() {
        let comment: ReviewComment = RawReviewComment {
            original_line: Some(12),
            position: Some(3),
            ..Default::default()
        }
        .into();
        assert_eq!(comment.line, Some(12));
    }

    #[test]
    fn test_status_maps_to_coarse_check() {
        let check: CheckRun = RawStatus {
            context: "ci/jenkins".to_string(),
            state: Some("error".to_string()),
            target_url: Some("https://jenkins.example/job/42".to_string()),
            ..Default::default()
        }
        .into();
        assert_eq!(check.name, "ci/jenkins");
        assert_eq!(check.state.as_deref(), Some("error"));
        assert!(check.conclusion.is_none());
    }
}
