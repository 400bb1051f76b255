//! Rebase execution through the git executable.
//!
//! git2 has no usable rebase driver for this, so start/continue/abort shell
//! out to `git rebase` and classify what happened from the exit status and
//! the repository state left behind.

use std::collections::BTreeMap;
use std::fs;

use git2::Oid;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Repository;
use crate::error::{Error, Result};
use crate::progress::rebase_state_dir;

/// Outcome of a rebase start or continue that did not fail outright.
///
/// Replaying zero commits is reported as `CompletedWithoutError` too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseOutcome {
    /// The rebase ran to the end.
    CompletedWithoutError { final_tip: Oid },
    /// The rebase stopped and waits for conflicts to be resolved.
    ConflictsEncountered { paths: Vec<String> },
}

/// Explicit choice for a conflicted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionChoice {
    /// Keep the version from the branch being rebased onto.
    Ours,
    /// Keep the version from the commit being replayed.
    Theirs,
}

impl ResolutionChoice {
    const fn checkout_flag(self) -> &'static str {
        match self {
            Self::Ours => "--ours",
            Self::Theirs => "--theirs",
        }
    }
}

impl std::fmt::Display for ResolutionChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ours => f.write_str("ours"),
            Self::Theirs => f.write_str("theirs"),
        }
    }
}

/// What git recorded about the rebase it is in the middle of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseInternalState {
    /// Branch being rebased, without `refs/heads/`.
    pub target_branch: String,
    /// Commit the branch is being replayed onto.
    pub base_branch_tip: String,
    /// Tip of the branch when the rebase began.
    pub original_branch_tip: String,
}

/// Classification of a finished `git rebase` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseExit {
    Completed,
    Stopped,
    NothingToCommit,
    Failed(String),
}

/// Classify a `git rebase` run from its exit status, output and whether a
/// rebase is still in progress afterwards.
#[must_use]
pub fn classify_rebase_exit(
    success: bool,
    still_rebasing: bool,
    stdout: &str,
    stderr: &str,
) -> RebaseExit {
    if success && !still_rebasing {
        return RebaseExit::Completed;
    }

    if still_rebasing {
        let text = format!("{stdout}\n{stderr}");
        if !text.contains("CONFLICT")
            && (text.contains("nothing to commit") || text.contains("No changes - did you forget"))
        {
            return RebaseExit::NothingToCommit;
        }
        return RebaseExit::Stopped;
    }

    let message = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    RebaseExit::Failed(message.to_string())
}

impl Repository {
    /// Rebase `target` onto `base`.
    ///
    /// # Errors
    /// Returns `RebaseFailed` if git refused to rebase (dirty tree, unknown
    /// refs, lock held by another process) without stopping on conflicts.
    pub fn start_rebase(&self, base: &str, target: &str) -> Result<RebaseOutcome> {
        info!(base, target, "starting rebase");
        let exit = self.run_rebase(&["rebase", base, target])?;
        self.outcome(exit, Some(target))
    }

    /// Apply manual resolutions, stage the resolved files and continue the
    /// rebase in progress.
    ///
    /// # Errors
    /// Returns `NoRebaseInProgress` if there is nothing to continue and
    /// `RebaseFailed` if git refused to continue.
    pub fn continue_rebase(
        &self,
        resolutions: &BTreeMap<String, ResolutionChoice>,
    ) -> Result<RebaseOutcome> {
        if !self.is_rebasing() {
            return Err(Error::NoRebaseInProgress);
        }

        for (path, choice) in resolutions {
            self.apply_resolution(path, *choice)?;
        }
        self.git_checked(&["add", "--update"])?;

        info!(manual = resolutions.len(), "continuing rebase");
        let exit = self.run_rebase(&["rebase", "--continue"])?;
        self.outcome(exit, None)
    }

    /// Abort the rebase in progress, restoring the original branch.
    ///
    /// # Errors
    /// Returns error if git fails to abort.
    pub fn abort_rebase(&self) -> Result<()> {
        info!("aborting rebase");
        self.git_checked(&["rebase", "--abort"])?;
        Ok(())
    }

    /// Read branch and commit anchors of the rebase in progress.
    ///
    /// Returns `None` when no rebase state directory exists or it is
    /// incomplete.
    #[must_use]
    pub fn rebase_internal_state(&self) -> Option<RebaseInternalState> {
        let dir = rebase_state_dir(self.git_dir())?;
        let read = |name: &str| {
            fs::read_to_string(dir.join(name))
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let head_name = read("head-name")?;
        let target_branch = head_name
            .strip_prefix("refs/heads/")
            .unwrap_or(&head_name)
            .to_string();

        Some(RebaseInternalState {
            target_branch,
            base_branch_tip: read("onto")?,
            original_branch_tip: read("orig-head")?,
        })
    }

    fn apply_resolution(&self, path: &str, choice: ResolutionChoice) -> Result<()> {
        debug!(path, %choice, "applying manual resolution");
        let checkout = self.git(&["checkout", choice.checkout_flag(), "--", path])?;
        if checkout.status.success() {
            return Ok(());
        }
        // The chosen side deleted the file
        self.git_checked(&["rm", "--quiet", "--", path])?;
        Ok(())
    }

    fn run_rebase(&self, args: &[&str]) -> Result<RebaseExit> {
        let output = self.git(args)?;
        let exit = classify_rebase_exit(
            output.status.success(),
            self.is_rebasing(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        );
        debug!(?exit, "rebase step finished");
        Ok(exit)
    }

    fn outcome(&self, mut exit: RebaseExit, target: Option<&str>) -> Result<RebaseOutcome> {
        // Patches that became empty after resolution are dropped
        while exit == RebaseExit::NothingToCommit {
            if !self.conflicting_files()?.is_empty() {
                exit = RebaseExit::Stopped;
                break;
            }
            info!("skipping commit with nothing left to apply");
            exit = self.run_rebase(&["rebase", "--skip"])?;
        }

        match exit {
            RebaseExit::Completed => {
                let final_tip = match target {
                    Some(branch) => self.branch_commit(branch)?,
                    None => self.resolve("HEAD")?,
                };
                Ok(RebaseOutcome::CompletedWithoutError { final_tip })
            }
            RebaseExit::Stopped | RebaseExit::NothingToCommit => {
                Ok(RebaseOutcome::ConflictsEncountered {
                    paths: self.conflicting_files()?,
                })
            }
            RebaseExit::Failed(message) => Err(Error::RebaseFailed(message)),
        }
    }
}
