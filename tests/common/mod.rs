//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{LogResponse, MockPlatformService};

use pr_doctor::types::{
    CheckRun, IssueComment, MergeMetadata, PlatformConfig, PullRequest, Review, ReviewComment,
    ReviewState,
};

/// Config for a repository on github.com
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "octo".to_string(),
        repo: "widgets".to_string(),
        host: None,
    }
}

/// Merge metadata with the given raw values
pub fn merge_meta(mergeable: Option<&str>, state: Option<&str>) -> MergeMetadata {
    MergeMetadata {
        mergeable: mergeable.map(str::to_string),
        merge_state_status: state.map(str::to_string),
        url: Some("https://github.com/octo/widgets/pull/42".to_string()),
        base_ref_name: Some("main".to_string()),
        head_ref_name: Some("feature".to_string()),
    }
}

/// PR #`number` authored by `alice`
pub fn make_pr(number: u64, merge: MergeMetadata) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/octo/widgets/pull/{number}"),
        author: "alice".to_string(),
        head_sha: "0123456789abcdef0123456789abcdef01234567".to_string(),
        merge,
    }
}

/// Check with the given raw fields
pub fn make_check(
    name: &str,
    conclusion: Option<&str>,
    state: Option<&str>,
    details_url: Option<&str>,
) -> CheckRun {
    CheckRun {
        name: name.to_string(),
        state: state.map(str::to_string),
        conclusion: conclusion.map(str::to_string),
        details_url: details_url.map(str::to_string),
        ..CheckRun::default()
    }
}

/// Failing GitHub Actions check for run `run_id`, job `job_id`
pub fn failing_actions_check(name: &str, run_id: u64, job_id: u64) -> CheckRun {
    make_check(
        name,
        Some("failure"),
        Some("completed"),
        Some(&format!(
            "https://github.com/octo/widgets/actions/runs/{run_id}/job/{job_id}"
        )),
    )
}

/// Review with a state and submission time
pub fn make_review(author: &str, state: &str, submitted_at: &str) -> Review {
    Review {
        author: author.to_string(),
        state: ReviewState::parse(Some(state)),
        submitted_at: submitted_at.to_string(),
        body: String::new(),
        url: format!("https://github.com/octo/widgets/pull/42#review-{author}"),
    }
}

/// Inline review comment
pub fn make_review_comment(author: &str, created_at: &str, body: &str) -> ReviewComment {
    ReviewComment {
        author: author.to_string(),
        path: "src/lib.rs".to_string(),
        line: Some(10),
        created_at: created_at.to_string(),
        body: body.to_string(),
        url: String::new(),
    }
}

/// Conversation comment
pub fn make_issue_comment(author: &str, created_at: &str, body: &str) -> IssueComment {
    IssueComment {
        author: author.to_string(),
        created_at: created_at.to_string(),
        body: body.to_string(),
        url: String::new(),
    }
}

/// Log of `len` lines with `marker` at `marker_index`
pub fn make_log(len: usize, marker_index: usize, marker: &str) -> String {
    (0..len)
        .map(|i| {
            if i == marker_index {
                marker.to_string()
            } else {
                format!("step {i} ok")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
