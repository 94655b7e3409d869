//! Integration tests for pr-doctor

#![allow(deprecated)] // cargo_bin is the standard way to test CLI binaries

mod common;

use assert_cmd::Command;
use common::github_config;
use mockito::{Matcher, Mock, Server, ServerGuard};
use pr_doctor::diagnosis::{LogRetriever, LogSource};
use pr_doctor::platform::{GitHubService, PlatformService};
use pr_doctor::types::{LogFetchResult, ReviewState};
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// CLI Tests
// =============================================================================

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("pr-doctor").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("not mergeable"))
        .stdout(predicate::str::contains("--max-lines"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("pr-doctor").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_rejects_non_numeric_max_lines() {
    let mut cmd = Command::cargo_bin("pr-doctor").unwrap();
    cmd.args(["--max-lines", "many"]);

    cmd.assert().failure();
}

#[test]
fn test_cli_outside_git_repo_fails() {
    let temp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("pr-doctor").unwrap();
    cmd.arg("--path").arg(temp.path());

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not inside a git repository"));
}

fn init_git_repo() -> TempDir {
    let temp = TempDir::new().unwrap();
    let status = std::process::Command::new("git")
        .args(["init", "--quiet"])
        .current_dir(temp.path())
        .status()
        .unwrap();
    assert!(status.success());
    temp
}

#[test]
fn test_cli_missing_remote_fails() {
    let repo = init_git_repo();
    let mut cmd = Command::cargo_bin("pr-doctor").unwrap();
    cmd.arg("--path").arg(repo.path()).args(["--remote", "upstream"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("remote 'upstream'"));
}

#[test]
fn test_cli_rejects_malformed_repo_override() {
    let repo = init_git_repo();
    let mut cmd = Command::cargo_bin("pr-doctor").unwrap();
    cmd.arg("--path").arg(repo.path()).args(["--repo", "widgets"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("OWNER/NAME"));
}

// =============================================================================
// GitHub REST Tests (mock server)
// =============================================================================

fn service(server: &ServerGuard) -> GitHubService {
    GitHubService::with_api_base("test-token", github_config(), &server.url()).unwrap()
}

async fn mock_json(server: &mut ServerGuard, path: &str, body: serde_json::Value) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

async fn mock_text(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_job_log_for_completed_job() {
    let mut server = Server::new_async().await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/actions/jobs/6",
        serde_json::json!({"id": 6, "name": "test", "status": "completed", "conclusion": "failure"}),
    )
    .await;
    let logs = mock_text(
        &mut server,
        "/repos/octo/widgets/actions/jobs/6/logs",
        "running tests\nError: boom\n",
    )
    .await;

    let github = service(&server);
    let log = github.fetch_job_log(6).await.unwrap();
    assert_eq!(log, b"running tests\nError: boom\n");
    logs.assert_async().await;
}

#[tokio::test]
async fn test_in_progress_run_and_job_are_pending() {
    let mut server = Server::new_async().await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/actions/runs/5",
        serde_json::json!({"id": 5, "status": "in_progress"}),
    )
    .await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/actions/jobs/6",
        serde_json::json!({"id": 6, "name": "test", "status": "in_progress"}),
    )
    .await;

    let github = service(&server);
    match LogRetriever::new(&github).fetch(5, Some(6)).await {
        LogFetchResult::Pending(reason) => assert!(reason.contains("job 6 is still in progress")),
        other => panic!("Expected Pending, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_run_log_joins_failed_job_logs() {
    let mut server = Server::new_async().await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/actions/runs/5",
        serde_json::json!({"id": 5, "name": "CI", "status": "completed", "conclusion": "failure"}),
    )
    .await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/actions/runs/5/jobs",
        serde_json::json!({"jobs": [
            {"id": 1, "name": "build", "status": "completed", "conclusion": "success"},
            {"id": 2, "name": "test", "status": "completed", "conclusion": "failure"}
        ]}),
    )
    .await;
    let failed_log = mock_text(&mut server, "/repos/octo/widgets/actions/jobs/2/logs", "boom").await;

    let github = service(&server);
    let log = github.fetch_run_log(5).await.unwrap();
    assert_eq!(String::from_utf8(log).unwrap(), "=== test ===\nboom\n");
    failed_log.assert_async().await;

    let meta = github.get_run_metadata(5).await.unwrap();
    assert_eq!(meta.name.as_deref(), Some("CI"));
    assert_eq!(meta.conclusion.as_deref(), Some("failure"));
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/octo/widgets/actions/runs/5")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Not Found"}"#)
        .create_async()
        .await;

    let github = service(&server);
    match LogRetriever::new(&github).fetch(5, Some(6)).await {
        LogFetchResult::Error(reason) => {
            assert!(reason.contains("404"));
            assert!(reason.contains("Not Found"));
        }
        other => panic!("Expected Error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_reviews_and_comments_parse_leniently() {
    let mut server = Server::new_async().await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/pulls/42/reviews",
        serde_json::json!([
            {"user": {"login": "bob"}, "state": "CHANGES_REQUESTED", "submitted_at": "2024-01-01T00:00:00Z", "body": "fix it", "html_url": "https://x/r/1"},
            {"user": null, "state": "COMMENTED"}
        ]),
    )
    .await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/pulls/42/comments",
        serde_json::json!([
            {"user": {"login": "carol"}, "path": "src/lib.rs", "line": null, "original_line": 7, "body": "nit"}
        ]),
    )
    .await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/issues/42/comments",
        serde_json::json!([]),
    )
    .await;

    let github = service(&server);
    let reviews = github.list_reviews(42).await.unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].author, "bob");
    assert_eq!(reviews[0].state, Some(ReviewState::ChangesRequested));
    assert_eq!(reviews[1].author, "");

    let comments = github.list_review_comments(42).await.unwrap();
    assert_eq!(comments[0].line, Some(7));
    assert!(github.list_issue_comments(42).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_checks_include_commit_statuses() {
    let mut server = Server::new_async().await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/commits/abc123/check-runs",
        serde_json::json!({"total_count": 1, "check_runs": [
            {"name": "test", "status": "completed", "conclusion": "failure",
             "details_url": "https://github.com/octo/widgets/actions/runs/5/job/6"}
        ]}),
    )
    .await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/commits/abc123/status",
        serde_json::json!({"state": "failure", "statuses": [
            {"context": "ci/jenkins", "state": "error", "target_url": "https://jenkins.example/job/1"}
        ]}),
    )
    .await;

    let github = service(&server);
    let checks = github.list_checks("abc123").await.unwrap();
    let names: Vec<_> = checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["test", "ci/jenkins"]);
    assert!(checks.iter().all(pr_doctor::diagnosis::is_failing));
}

#[tokio::test]
async fn test_missing_commit_statuses_are_tolerated() {
    let mut server = Server::new_async().await;
    mock_json(
        &mut server,
        "/repos/octo/widgets/commits/abc123/check-runs",
        serde_json::json!({"check_runs": []}),
    )
    .await;
    server
        .mock("GET", "/repos/octo/widgets/commits/abc123/status")
        .with_status(500)
        .create_async()
        .await;

    let github = service(&server);
    assert!(github.list_checks("abc123").await.unwrap().is_empty());
}
