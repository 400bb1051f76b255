//! Rebase progress read from the rebase state directories.
//!
//! Git keeps the state of an interrupted rebase under `.git/rebase-merge`
//! (merge backend) or `.git/rebase-apply` (apply backend). Progress is only
//! readable while one of them exists, so it is never cached.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::Repository;

/// Snapshot of a rebase in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebaseProgress {
    /// Commits already replayed onto the new base.
    pub completed_commit_count: usize,
    /// Commits the rebase will replay in total.
    pub total_commit_count: usize,
    /// Summary of the commit currently being applied.
    pub current_commit_summary: Option<String>,
}

impl RebaseProgress {
    /// Fraction of the rebase that is done, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total_commit_count == 0 {
            return 0.0;
        }
        (self.completed_commit_count as f64 / self.total_commit_count as f64).min(1.0)
    }
}

impl Repository {
    /// Read progress of the rebase in progress, if any.
    #[must_use]
    pub fn rebase_progress(&self) -> Option<RebaseProgress> {
        read_rebase_progress(self.git_dir())
    }
}

/// Read rebase progress from a `.git` directory.
///
/// Returns `None` when no rebase is in progress or the counters are
/// unreadable.
#[must_use]
pub fn read_rebase_progress(git_dir: &Path) -> Option<RebaseProgress> {
    let rebase_merge = git_dir.join("rebase-merge");
    if rebase_merge.is_dir() {
        let current: usize = read_number(&rebase_merge.join("msgnum"))?;
        let total: usize = read_number(&rebase_merge.join("end"))?;
        let summary = fs::read_to_string(rebase_merge.join("done"))
            .ok()
            .and_then(|done| done.lines().rev().find_map(todo_line_summary));
        return Some(RebaseProgress {
            completed_commit_count: current.saturating_sub(1).min(total),
            total_commit_count: total,
            current_commit_summary: summary,
        });
    }

    let rebase_apply = git_dir.join("rebase-apply");
    if rebase_apply.is_dir() {
        let current: usize = read_number(&rebase_apply.join("next"))?;
        let total: usize = read_number(&rebase_apply.join("last"))?;
        let summary = ["msg-clean", "final-commit"]
            .into_iter()
            .find_map(|name| first_line(&rebase_apply.join(name)));
        return Some(RebaseProgress {
            completed_commit_count: current.saturating_sub(1).min(total),
            total_commit_count: total,
            current_commit_summary: summary,
        });
    }

    None
}

/// The rebase state directory in use, if any.
pub(crate) fn rebase_state_dir(git_dir: &Path) -> Option<PathBuf> {
    ["rebase-merge", "rebase-apply"]
        .into_iter()
        .map(|name| git_dir.join(name))
        .find(|dir| dir.is_dir())
}

fn read_number(path: &Path) -> Option<usize> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn first_line(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let line = content.lines().next()?.trim();
    (!line.is_empty()).then(|| line.to_string())
}

/// Summary from a todo line such as `pick 1a2b3c4 Fix the widget`.
fn todo_line_summary(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut parts = line.splitn(3, char::is_whitespace);
    let _command = parts.next()?;
    let _sha = parts.next()?;
    let summary = parts.next()?.trim();
    (!summary.is_empty()).then(|| summary.to_string())
}
