//! Shared setup for the diagnose command
//!
//! Resolves the repository, the platform service and the pull request to
//! look at.

use pr_doctor::error::{Error, Result};
use pr_doctor::platform::{
    PlatformService, create_platform_service, extract_pr_number, parse_repo_info,
};
use pr_doctor::repo::{current_branch, find_git_root, remote_url};
use pr_doctor::types::PlatformConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything a command needs to talk to the host
pub struct CommandContext {
    /// Root of the local git work tree
    pub repo_root: PathBuf,
    /// Repository coordinates on the host
    pub config: PlatformConfig,
    /// Platform service
    pub platform: Box<dyn PlatformService>,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// `repo` overrides the remote: either `OWNER/NAME` or a full remote URL.
    pub async fn new(path: &Path, remote: &str, repo: Option<&str>) -> Result<Self> {
        let repo_root = find_git_root(path).await?;

        let config = match repo {
            Some(repo) => parse_repo_override(repo)?,
            None => parse_repo_info(&remote_url(&repo_root, remote).await?)?,
        };
        debug!(repo = %config.slug(), host = ?config.host, "resolved repository");

        let platform = create_platform_service(&config).await?;

        Ok(Self {
            repo_root,
            config,
            platform,
        })
    }

    /// Resolve the PR to diagnose
    ///
    /// Accepts a number, a PR URL or a branch name. Without a value the
    /// current branch is used.
    pub async fn resolve_pr(&self, pr: Option<&str>) -> Result<u64> {
        if let Some(value) = pr {
            if let Some(number) = extract_pr_number(value) {
                return Ok(number);
            }
            return self.pr_for_branch(value.trim()).await;
        }

        let branch = current_branch(&self.repo_root).await?;
        self.pr_for_branch(&branch).await
    }

    async fn pr_for_branch(&self, branch: &str) -> Result<u64> {
        debug!(branch, "looking up PR for branch");
        self.platform
            .find_pr_for_branch(branch)
            .await?
            .ok_or_else(|| {
                Error::PrNotFound(format!(
                    "no open pull request for branch '{branch}' in {}",
                    self.config.slug()
                ))
            })
    }
}

/// Parse `--repo`: `OWNER/NAME`, or anything `parse_repo_info` accepts
fn parse_repo_override(value: &str) -> Result<PlatformConfig> {
    let value = value.trim();
    if value.contains("://") || value.contains('@') {
        return parse_repo_info(value);
    }

    match value.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok(PlatformConfig {
                owner: owner.to_string(),
                repo: repo.strip_suffix(".git").unwrap_or(repo).to_string(),
                host: None,
            })
        }
        _ => Err(Error::Repository(format!(
            "expected OWNER/NAME for --repo, got '{value}'"
        ))),
    }
}
