//! Repository and PR identity parsing

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

const GITHUB_HOST: &str = "github.com";

static PR_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/pull/(\d+)").expect("valid regex"));

/// Parse a git remote URL into repository coordinates.
///
/// Supports `https://host/owner/repo(.git)`, `ssh://git@host/owner/repo`
/// and scp-like `git@host:owner/repo(.git)`. Hosts other than github.com
/// are treated as GitHub Enterprise.
pub fn parse_repo_info(remote_url: &str) -> Result<PlatformConfig> {
    let remote_url = remote_url.trim();
    let (host, path) = split_remote(remote_url)
        .ok_or_else(|| Error::Repository(format!("unrecognized remote URL: {remote_url}")))?;

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.rsplitn(2, '/');
    let repo = parts.next().unwrap_or_default();
    let owner = parts.next().unwrap_or_default();

    if owner.is_empty() || repo.is_empty() {
        return Err(Error::Repository(format!(
            "remote URL has no owner/repo path: {remote_url}"
        )));
    }

    let host = host.to_lowercase();
    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host: (host != GITHUB_HOST).then_some(host),
    })
}

fn split_remote(remote_url: &str) -> Option<(String, String)> {
    if remote_url.contains("://") {
        let parsed = Url::parse(remote_url).ok()?;
        let host = parsed.host_str()?.to_string();
        return Some((host, parsed.path().to_string()));
    }

    // scp-like syntax: [user@]host:path
    let (authority, path) = remote_url.split_once(':')?;
    let host = authority.rsplit('@').next()?;
    if host.is_empty() || path.is_empty() {
        return None;
    }
    Some((host.to_string(), path.to_string()))
}

/// Extract a PR number from a number or a PR URL
pub fn extract_pr_number(value: &str) -> Option<u64> {
    let value = value.trim();
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.parse().ok();
    }
    PR_URL_PATTERN
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_https() {
        let config = parse_repo_info("https://github.com/owner/repo.git").unwrap();
        assert_eq!(config.owner, "owner");
        assert_eq!(config.repo, "repo");
        assert!(config.host.is_none());
    }

    #[test]
    fn test_github_ssh_without_git_extension() {
        let config = parse_repo_info("git@github.com:owner/repo").unwrap();
        assert_eq!(config.slug(), "owner/repo");
        assert!(config.host.is_none());
    }

    #[test]
    fn test_ssh_scheme() {
        let config = parse_repo_info("ssh://git@github.com/owner/repo.git").unwrap();
        assert_eq!(config.slug(), "owner/repo");
    }

    #[test]
    fn test_enterprise_host() {
        let config = parse_repo_info("https://GHE.corp.example/team/service").unwrap();
        assert_eq!(config.host.as_deref(), Some("ghe.corp.example"));
        assert_eq!(config.slug(), "team/service");
    }

    #[test]
    fn test_rejects_path_without_owner() {
        assert!(matches!(
            parse_repo_info("https://github.com/repo"),
            Err(Error::Repository(_))
        ));
        assert!(parse_repo_info("not a url").is_err());
    }

    #[test]
    fn test_extract_pr_number() {
        assert_eq!(extract_pr_number("42"), Some(42));
        assert_eq!(
            extract_pr_number("https://github.com/o/r/pull/1234/files"),
            Some(1234)
        );
        assert_eq!(extract_pr_number("feature/login"), None);
        assert_eq!(extract_pr_number(""), None);
    }
}
