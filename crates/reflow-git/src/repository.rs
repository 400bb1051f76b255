//! Repository wrapper providing high-level git operations.

use std::collections::HashSet;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use git2::{BranchType, ErrorCode, Oid, RepositoryState};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// A commit reduced to what the flow needs to show or store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Full commit SHA.
    pub id: String,
    /// First line of the commit message.
    pub summary: String,
}

/// High-level wrapper around a git repository.
pub struct Repository {
    inner: git2::Repository,
}

impl Repository {
    /// Open a repository at the given path.
    ///
    /// # Errors
    /// Returns error if no repository found at path or any parent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::discover(path)?;
        Ok(Self { inner })
    }

    /// Open the repository containing the current directory.
    ///
    /// # Errors
    /// Returns error if not inside a git repository.
    pub fn open_current() -> Result<Self> {
        Self::open(".")
    }

    /// Get the path to the repository root (workdir).
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.inner.workdir()
    }

    /// Get the path to the .git directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    /// Get the current repository state.
    #[must_use]
    pub fn state(&self) -> RepositoryState {
        self.inner.state()
    }

    /// Check if there's a rebase in progress.
    #[must_use]
    pub fn is_rebasing(&self) -> bool {
        matches!(
            self.state(),
            RepositoryState::Rebase
                | RepositoryState::RebaseInteractive
                | RepositoryState::RebaseMerge
                | RepositoryState::ApplyMailboxOrRebase
        )
    }

    /// Check if a merge (not a rebase) is waiting for conflict resolution.
    #[must_use]
    pub fn is_merging(&self) -> bool {
        self.state() == RepositoryState::Merge
    }

    // === Branch operations ===

    /// Get the name of the current branch.
    ///
    /// # Errors
    /// Returns `DetachedHead` if HEAD is detached and `UnbornBranch` if the
    /// branch has no commits.
    pub fn current_branch(&self) -> Result<String> {
        let head = match self.inner.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Err(Error::UnbornBranch),
            Err(e) => return Err(e.into()),
        };
        if !head.is_branch() {
            return Err(Error::DetachedHead);
        }

        head.shorthand()
            .map(String::from)
            .ok_or(Error::DetachedHead)
    }

    /// Check if HEAD is detached.
    ///
    /// # Errors
    /// Returns error if HEAD cannot be read.
    pub fn head_detached(&self) -> Result<bool> {
        Ok(self.inner.head_detached()?)
    }

    /// Get the commit SHA for a branch.
    ///
    /// # Errors
    /// Returns error if branch doesn't exist.
    pub fn branch_commit(&self, branch_name: &str) -> Result<Oid> {
        let branch = self
            .inner
            .find_branch(branch_name, BranchType::Local)
            .map_err(|_| Error::BranchNotFound(branch_name.into()))?;

        branch
            .get()
            .target()
            .ok_or_else(|| Error::BranchNotFound(branch_name.into()))
    }

    /// Checkout a branch.
    ///
    /// # Errors
    /// Returns error if the branch is missing or the checkout would clobber
    /// local changes.
    pub fn checkout(&self, branch_name: &str) -> Result<()> {
        if !self.branch_exists(branch_name) {
            return Err(Error::BranchNotFound(branch_name.into()));
        }
        self.git_checked(&["checkout", branch_name])?;
        Ok(())
    }

    /// List all local branches.
    ///
    /// # Errors
    /// Returns error if branch listing fails.
    pub fn list_branches(&self) -> Result<Vec<String>> {
        let branches = self.inner.branches(Some(BranchType::Local))?;

        let mut names: Vec<String> = branches
            .filter_map(std::result::Result::ok)
            .filter_map(|(b, _)| b.name().ok().flatten().map(String::from))
            .collect();
        names.sort();

        Ok(names)
    }

    /// Check if a branch exists.
    #[must_use]
    pub fn branch_exists(&self, name: &str) -> bool {
        self.inner.find_branch(name, BranchType::Local).is_ok()
    }

    /// Get the upstream (remote-tracking) branch of a local branch, e.g.
    /// `origin/feature`.
    #[must_use]
    pub fn upstream_branch(&self, branch_name: &str) -> Option<String> {
        let branch = self
            .inner
            .find_branch(branch_name, BranchType::Local)
            .ok()?;
        let upstream = branch.upstream().ok()?;
        upstream.name().ok().flatten().map(String::from)
    }

    /// Detect the default branch for a remote.
    ///
    /// Follows `refs/remotes/<remote>/HEAD` when present, otherwise falls back
    /// to a local `main` or `master`.
    #[must_use]
    pub fn default_branch(&self, remote: &str) -> Option<String> {
        let head_ref = format!("refs/remotes/{remote}/HEAD");
        if let Ok(reference) = self.inner.find_reference(&head_ref) {
            if let Some(target) = reference.symbolic_target() {
                let prefix = format!("refs/remotes/{remote}/");
                if let Some(name) = target.strip_prefix(&prefix) {
                    return Some(name.to_string());
                }
            }
        }

        ["main", "master"]
            .into_iter()
            .find(|name| self.branch_exists(name))
            .map(String::from)
    }

    /// Branches recently checked out, most recent first.
    ///
    /// Parses `checkout: moving from A to B` entries of the HEAD reflog and
    /// keeps names that still exist as local branches.
    ///
    /// # Errors
    /// Returns error if the reflog cannot be read.
    pub fn recent_branches(&self, limit: usize) -> Result<Vec<String>> {
        let reflog = self.inner.reflog("HEAD")?;
        let mut seen = HashSet::new();
        let mut recent = Vec::new();

        for entry in reflog.iter() {
            if recent.len() >= limit {
                break;
            }
            let Some(message) = entry.message() else {
                continue;
            };
            let Some(name) = parse_checkout_target(message) else {
                continue;
            };
            if self.branch_exists(name) && seen.insert(name.to_string()) {
                recent.push(name.to_string());
            }
        }

        Ok(recent)
    }

    // === Working directory state ===

    /// Check if the working directory is clean.
    ///
    /// # Errors
    /// Returns error if status check fails.
    pub fn is_clean(&self) -> Result<bool> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(false);
        let statuses = self.inner.statuses(Some(&mut opts))?;
        Ok(statuses.is_empty())
    }

    /// Ensure working directory is clean, returning error if not.
    ///
    /// # Errors
    /// Returns `DirtyWorkingDirectory` if there are uncommitted changes.
    pub fn require_clean(&self) -> Result<()> {
        if self.is_clean()? {
            Ok(())
        } else {
            Err(Error::DirtyWorkingDirectory)
        }
    }

    // === Commit operations ===

    /// Resolve any revision (branch, remote branch, SHA) to a commit id.
    ///
    /// # Errors
    /// Returns `RefNotFound` if the revision does not name a commit.
    pub fn resolve(&self, rev: &str) -> Result<Oid> {
        self.inner
            .revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|_| Error::RefNotFound(rev.into()))
    }

    /// Get the summary line of a commit.
    ///
    /// # Errors
    /// Returns error if commit not found.
    pub fn commit_summary(&self, oid: Oid) -> Result<String> {
        let commit = self.inner.find_commit(oid)?;
        Ok(commit.summary().unwrap_or_default().to_string())
    }

    /// Commits reachable from `to` but not from `from`, newest first.
    ///
    /// Returns `Ok(None)` when either revision cannot be resolved.
    ///
    /// # Errors
    /// Returns error if the revision walk fails.
    pub fn commits_in_range(&self, from: &str, to: &str) -> Result<Option<Vec<CommitInfo>>> {
        let (Ok(from), Ok(to)) = (self.resolve(from), self.resolve(to)) else {
            return Ok(None);
        };

        let mut revwalk = self.inner.revwalk()?;
        revwalk.push(to)?;
        revwalk.hide(from)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            commits.push(CommitInfo {
                id: oid.to_string(),
                summary: self.commit_summary(oid)?,
            });
        }
        Ok(Some(commits))
    }

    // === Reset operations ===

    /// Hard reset a branch to a specific commit.
    ///
    /// # Errors
    /// Returns error if reset fails.
    pub fn reset_branch(&self, branch_name: &str, target: Oid) -> Result<()> {
        let commit = self.inner.find_commit(target)?;
        let reference_name = format!("refs/heads/{branch_name}");
        let short = target.to_string();

        self.inner.reference(
            &reference_name,
            target,
            true,
            &format!("reflow: reset to {}", &short[..8.min(short.len())]),
        )?;

        // The current branch also needs its working tree moved
        if self.current_branch().ok().as_deref() == Some(branch_name) {
            self.inner
                .reset(commit.as_object(), git2::ResetType::Hard, None)?;
        }

        Ok(())
    }

    // === git executable ===

    /// Run a git subcommand in the working directory and return its raw output.
    ///
    /// Stdin is closed and the editor is disabled so git never waits on a
    /// prompt.
    pub(crate) fn git(&self, args: &[&str]) -> Result<Output> {
        let dir = self.workdir().unwrap_or_else(|| self.git_dir());
        debug!(?args, "running git");
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_EDITOR", "true")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .map_err(Error::Spawn)
    }

    /// Run a git subcommand, failing with `CommandFailed` on a non-zero exit.
    pub(crate) fn git_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.git(args)?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(Error::CommandFailed {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    // === Low-level access ===

    /// Get a reference to the underlying git2 repository.
    ///
    /// Use sparingly - prefer high-level methods.
    #[must_use]
    pub const fn inner(&self) -> &git2::Repository {
        &self.inner
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.git_dir())
            .finish()
    }
}

/// Extract the destination of a `checkout: moving from A to B` reflog message.
fn parse_checkout_target(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("checkout: moving from ")?;
    let (_, to) = rest.rsplit_once(" to ")?;
    let to = to.trim();
    (!to.is_empty()).then_some(to)
}
