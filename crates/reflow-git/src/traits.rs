//! Trait abstractions for git operations.
//!
//! This module defines the `GitOps` trait which abstracts git operations,
//! enabling dependency injection and testability.

use std::collections::BTreeMap;
use std::path::Path;

use git2::Oid;

use crate::{
    CommitInfo, RebaseInternalState, RebaseOutcome, RebaseProgress, Repository,
    ResolutionChoice, Result, WorkingFile,
};

/// Trait for git repository operations.
///
/// This trait abstracts git operations, allowing for:
/// - Dependency injection in services
/// - Mock implementations for testing
///
/// Git operations are synchronous; each call returns only once the
/// underlying git process has exited.
#[allow(clippy::missing_errors_doc)]
pub trait GitOps {
    // === Repository Info ===

    /// Get the working directory path.
    fn workdir(&self) -> Option<&Path>;

    /// Get the current branch name.
    ///
    /// Returns an error if HEAD is detached or the branch is unborn.
    fn current_branch(&self) -> Result<String>;

    /// Check if a rebase is in progress.
    fn is_rebasing(&self) -> bool;

    /// Check if a merge is waiting for conflict resolution.
    fn is_merging(&self) -> bool;

    // === Branch Operations ===

    /// Check if a branch exists.
    fn branch_exists(&self, name: &str) -> bool;

    /// List all local branches.
    fn list_branches(&self) -> Result<Vec<String>>;

    /// Branches recently checked out, most recent first.
    fn recent_branches(&self, limit: usize) -> Result<Vec<String>>;

    /// Default branch for a remote.
    fn default_branch(&self, remote: &str) -> Option<String>;

    /// Upstream of a local branch, e.g. `origin/feature`.
    fn upstream_branch(&self, branch: &str) -> Option<String>;

    /// Checkout a branch.
    fn checkout(&self, branch: &str) -> Result<()>;

    // === Commit Operations ===

    /// Get the commit ID for a branch.
    fn branch_commit(&self, branch: &str) -> Result<Oid>;

    /// Commits reachable from `to` but not from `from`.
    ///
    /// `None` when either ref cannot be resolved.
    fn commits_in_range(&self, from: &str, to: &str) -> Result<Option<Vec<CommitInfo>>>;

    /// Reset a branch to a specific commit.
    fn reset_branch(&self, branch: &str, commit: Oid) -> Result<()>;

    // === Working Directory ===

    /// Read the working directory status.
    fn working_directory_status(&self) -> Result<Vec<WorkingFile>>;

    // === Rebase Operations ===

    /// Rebase `target` onto `base`.
    fn start_rebase(&self, base: &str, target: &str) -> Result<RebaseOutcome>;

    /// Continue the rebase in progress after applying manual resolutions.
    fn continue_rebase(
        &self,
        resolutions: &BTreeMap<String, ResolutionChoice>,
    ) -> Result<RebaseOutcome>;

    /// Abort the rebase in progress.
    fn abort_rebase(&self) -> Result<()>;

    /// Progress of the rebase in progress.
    fn rebase_progress(&self) -> Option<RebaseProgress>;

    /// Branch and commit anchors of the rebase in progress.
    fn rebase_internal_state(&self) -> Option<RebaseInternalState>;

    // === Remote Operations ===

    /// Push a branch, optionally with `--force-with-lease`.
    fn push(&self, remote: &str, branch: &str, force: bool) -> Result<()>;

    /// Fetch a remote.
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Pull a branch with fast-forward only.
    fn pull(&self, remote: &str, branch: &str) -> Result<()>;

    /// Merge a branch into the current branch.
    fn merge(&self, branch: &str) -> Result<()>;

    /// Cherry-pick commits onto the current branch.
    fn cherry_pick(&self, commits: &[String]) -> Result<()>;
}

impl GitOps for Repository {
    fn workdir(&self) -> Option<&Path> {
        Self::workdir(self)
    }

    fn current_branch(&self) -> Result<String> {
        Self::current_branch(self)
    }

    fn is_rebasing(&self) -> bool {
        Self::is_rebasing(self)
    }

    fn is_merging(&self) -> bool {
        Self::is_merging(self)
    }

    fn branch_exists(&self, name: &str) -> bool {
        Self::branch_exists(self, name)
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        Self::list_branches(self)
    }

    fn recent_branches(&self, limit: usize) -> Result<Vec<String>> {
        Self::recent_branches(self, limit)
    }

    fn default_branch(&self, remote: &str) -> Option<String> {
        Self::default_branch(self, remote)
    }

    fn upstream_branch(&self, branch: &str) -> Option<String> {
        Self::upstream_branch(self, branch)
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        Self::checkout(self, branch)
    }

    fn branch_commit(&self, branch: &str) -> Result<Oid> {
        Self::branch_commit(self, branch)
    }

    fn commits_in_range(&self, from: &str, to: &str) -> Result<Option<Vec<CommitInfo>>> {
        Self::commits_in_range(self, from, to)
    }

    fn reset_branch(&self, branch: &str, commit: Oid) -> Result<()> {
        Self::reset_branch(self, branch, commit)
    }

    fn working_directory_status(&self) -> Result<Vec<WorkingFile>> {
        Self::working_directory_status(self)
    }

    fn start_rebase(&self, base: &str, target: &str) -> Result<RebaseOutcome> {
        Self::start_rebase(self, base, target)
    }

    fn continue_rebase(
        &self,
        resolutions: &BTreeMap<String, ResolutionChoice>,
    ) -> Result<RebaseOutcome> {
        Self::continue_rebase(self, resolutions)
    }

    fn abort_rebase(&self) -> Result<()> {
        Self::abort_rebase(self)
    }

    fn rebase_progress(&self) -> Option<RebaseProgress> {
        Self::rebase_progress(self)
    }

    fn rebase_internal_state(&self) -> Option<RebaseInternalState> {
        Self::rebase_internal_state(self)
    }

    fn push(&self, remote: &str, branch: &str, force: bool) -> Result<()> {
        Self::push(self, remote, branch, force)
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        Self::fetch(self, remote)
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        Self::pull(self, remote, branch)
    }

    fn merge(&self, branch: &str) -> Result<()> {
        Self::merge(self, branch)
    }

    fn cherry_pick(&self, commits: &[String]) -> Result<()> {
        Self::cherry_pick(self, commits)
    }
}
