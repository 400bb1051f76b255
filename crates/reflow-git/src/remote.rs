//! Network and branch-integration operations run through the git executable.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::info;

use crate::Repository;
use crate::error::{Error, Result};

impl Repository {
    /// Push a branch to a remote, setting its upstream.
    ///
    /// A forced push uses `--force-with-lease` so remote work that was never
    /// fetched is not overwritten.
    ///
    /// # Errors
    /// Returns `PushFailed` with git's message on failure.
    pub fn push(&self, remote: &str, branch: &str, force: bool) -> Result<()> {
        info!(remote, branch, force, "pushing");
        let mut args = vec!["push", "--set-upstream"];
        if force {
            args.push("--force-with-lease");
        }
        args.extend([remote, branch]);

        self.git_checked(&args).map_err(|e| match e {
            Error::CommandFailed { stderr, .. } => Error::PushFailed(stderr),
            other => other,
        })?;
        Ok(())
    }

    /// Fetch a remote, pruning deleted branches.
    ///
    /// # Errors
    /// Returns `FetchFailed` with git's message on failure.
    pub fn fetch(&self, remote: &str) -> Result<()> {
        info!(remote, "fetching");
        self.git_checked(&["fetch", "--prune", remote])
            .map_err(|e| match e {
                Error::CommandFailed { stderr, .. } => Error::FetchFailed(stderr),
                other => other,
            })?;
        Ok(())
    }

    /// Pull the current branch from a remote (fast-forward only).
    ///
    /// # Errors
    /// Returns `PullFailed` with git's message on failure.
    pub fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        info!(remote, branch, "pulling");
        self.git_checked(&["pull", "--ff-only", remote, branch])
            .map_err(|e| match e {
                Error::CommandFailed { stderr, .. } => Error::PullFailed(stderr),
                other => other,
            })?;
        Ok(())
    }

    /// Merge a branch into the current branch.
    ///
    /// # Errors
    /// Returns error if the merge fails or stops on conflicts.
    pub fn merge(&self, branch: &str) -> Result<()> {
        info!(branch, "merging");
        self.git_checked(&["merge", "--no-edit", branch])?;
        Ok(())
    }

    /// Cherry-pick commits onto the current branch, in order.
    ///
    /// # Errors
    /// Returns error if any cherry-pick fails or stops on conflicts.
    pub fn cherry_pick(&self, commits: &[String]) -> Result<()> {
        info!(count = commits.len(), "cherry-picking");
        let mut args = vec!["cherry-pick"];
        args.extend(commits.iter().map(String::as_str));
        self.git_checked(&args)?;
        Ok(())
    }
}

/// Clone `url` into `path`, optionally checking out `branch`.
///
/// # Errors
/// Returns `CommandFailed` with git's message on failure.
pub fn clone_repository(url: &str, path: &Path, branch: Option<&str>) -> Result<()> {
    info!(url, path = %path.display(), "cloning");
    let mut command = Command::new("git");
    command.arg("clone");
    if let Some(branch) = branch {
        command.args(["--branch", branch]);
    }
    let output = command
        .arg(url)
        .arg(path)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .output()
        .map_err(Error::Spawn)?;

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::CommandFailed {
            command: "clone".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
