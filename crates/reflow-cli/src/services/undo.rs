//! Undo service: restores a rebased branch to its pre-rebase tip.

use anyhow::{Context, Result, bail};
use reflow_core::StateStore;
use reflow_git::{GitOps, Oid};
use serde::Serialize;
use tracing::info;

/// Result of an undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndoResult {
    pub branch: String,
    pub restored_tip: String,
}

/// Service for restoring rewritten branches.
pub struct UndoService<'a, G: GitOps, S: StateStore> {
    repo: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> UndoService<'a, G, S> {
    /// Create a new undo service.
    #[must_use]
    pub const fn new(repo: &'a G, state: &'a S) -> Self {
        Self { repo, state }
    }

    /// Reset `branch` to the tip it had before its last rebase and drop its
    /// force push entry.
    pub fn restore(&self, branch: &str) -> Result<UndoResult> {
        if self.state.is_flow_active() || self.repo.is_rebasing() {
            bail!("Cannot undo while a rebase is in progress - finish or abort it first");
        }

        let mut record = self.state.load_force_push_record()?;
        let Some(original) = record.original_tip(branch).map(String::from) else {
            bail!("No rebase of '{branch}' to undo");
        };

        let oid = Oid::from_str(&original)
            .with_context(|| format!("Recorded tip '{original}' is not a commit id"))?;
        self.repo.reset_branch(branch, oid)?;
        record.reconcile(branch, &original);
        self.state.save_force_push_record(&record)?;

        info!(branch, tip = %original, "branch restored");
        Ok(UndoResult {
            branch: branch.to_string(),
            restored_tip: original,
        })
    }
}
