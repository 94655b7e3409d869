//! Local git repository queries

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

async fn git(path: &Path, args: &[&str]) -> Result<String> {
    debug!(?args, path = %path.display(), "running git");
    let output = Command::new("git")
        .arg("-C")
        .arg(path)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Root of the git work tree containing `path`
pub async fn find_git_root(path: &Path) -> Result<PathBuf> {
    let root = git(path, &["rev-parse", "--show-toplevel"])
        .await
        .map_err(|_| Error::Git(format!("not inside a git repository: {}", path.display())))?;
    Ok(PathBuf::from(root))
}

/// Fetch URL of a remote
pub async fn remote_url(path: &Path, remote: &str) -> Result<String> {
    git(path, &["remote", "get-url", remote])
        .await
        .map_err(|e| Error::Repository(format!("remote '{remote}' not usable: {e}")))
}

/// Name of the checked-out branch
pub async fn current_branch(path: &Path) -> Result<String> {
    let branch = git(path, &["rev-parse", "--abbrev-ref", "HEAD"]).await?;
    if branch.is_empty() || branch == "HEAD" {
        return Err(Error::PrNotFound(
            "HEAD is detached; pass --pr to pick a pull request".to_string(),
        ));
    }
    Ok(branch)
}
