//! Remote operations that consult and maintain the force push record.
//!
//! Every failure is remembered as a [`RetryDescriptor`] so `reflow retry`
//! can re-issue exactly the same operation.

use anyhow::{Context, Result};
use reflow_core::{FailedOperation, RetryDescriptor, StateStore};
use reflow_git::GitOps;
use serde::Serialize;
use tracing::{debug, info};

/// What a push of one branch will do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushPlan {
    pub remote: String,
    pub branch: String,
    /// Whether the push must overwrite the remote history.
    pub force: bool,
    /// Tip the branch had before its history was rewritten.
    pub original_tip: Option<String>,
}

impl PushPlan {
    /// Descriptor that re-issues this push.
    #[must_use]
    pub fn descriptor(&self) -> RetryDescriptor {
        RetryDescriptor::Push {
            remote: self.remote.clone(),
            branch: self.branch.clone(),
            force: self.force,
        }
    }
}

/// Service for push, pull and fetch with trait-based dependencies.
pub struct RemoteService<'a, G: GitOps, S: StateStore> {
    repo: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> RemoteService<'a, G, S> {
    /// Create a new remote service.
    #[must_use]
    pub const fn new(repo: &'a G, state: &'a S) -> Self {
        Self { repo, state }
    }

    /// Remote configured for push, pull and fetch.
    pub fn default_remote(&self) -> Result<String> {
        Ok(self.state.load_config()?.general.default_remote)
    }

    /// Decide whether pushing `branch` needs `--force`.
    ///
    /// An entry whose recorded tip equals the branch's current tip is stale
    /// (the branch was reset back) and is dropped here.
    pub fn plan_push(&self, branch: &str) -> Result<PushPlan> {
        let remote = self.default_remote()?;
        let tip = self.repo.branch_commit(branch)?.to_string();

        let mut record = self.state.load_force_push_record()?;
        if record.reconcile(branch, &tip) {
            debug!(branch, "branch is back at its recorded tip");
            self.state.save_force_push_record(&record)?;
        }

        Ok(PushPlan {
            remote,
            branch: branch.to_string(),
            force: record.needs_force_push(branch),
            original_tip: record.original_tip(branch).map(String::from),
        })
    }

    /// Push according to `plan`. A successful force push clears the
    /// branch's force push entry.
    pub fn push(&self, plan: &PushPlan) -> Result<()> {
        self.push_branch(&plan.remote, &plan.branch, plan.force)
    }

    /// Push `branch` to `remote`, recording the failure for retry.
    pub fn push_branch(&self, remote: &str, branch: &str, force: bool) -> Result<()> {
        let descriptor = RetryDescriptor::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
            force,
        };
        self.run_recorded(&descriptor, || self.repo.push(remote, branch, force))
            .with_context(|| format!("Failed to push '{branch}' to '{remote}'"))?;

        if force {
            let mut record = self.state.load_force_push_record()?;
            if record.confirm_force_push(branch).is_some() {
                info!(branch, "force push confirmed");
                self.state.save_force_push_record(&record)?;
            }
        }
        Ok(())
    }

    /// Pull `branch` from `remote`, fast-forward only.
    pub fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        let descriptor = RetryDescriptor::Pull {
            remote: remote.to_string(),
            branch: branch.to_string(),
        };
        self.run_recorded(&descriptor, || self.repo.pull(remote, branch))
            .with_context(|| format!("Failed to pull '{branch}' from '{remote}'"))
    }

    /// Fetch `remote`.
    pub fn fetch(&self, remote: &str) -> Result<()> {
        let descriptor = RetryDescriptor::Fetch {
            remote: remote.to_string(),
        };
        self.run_recorded(&descriptor, || self.repo.fetch(remote))
            .with_context(|| format!("Failed to fetch '{remote}'"))
    }

    /// Run `op`; remember `descriptor` if it fails and forget it once it
    /// succeeds.
    pub fn run_recorded(
        &self,
        descriptor: &RetryDescriptor,
        op: impl FnOnce() -> reflow_git::Result<()>,
    ) -> Result<()> {
        match op() {
            Ok(()) => {
                let pending = self.state.load_failed_operation()?;
                if pending.is_some_and(|p| p.descriptor == *descriptor) {
                    self.state.clear_failed_operation()?;
                }
                Ok(())
            }
            Err(e) => {
                debug!(operation = %descriptor, "recording failed operation");
                self.state.save_failed_operation(&FailedOperation::new(
                    descriptor.clone(),
                    e.to_string(),
                ))?;
                Err(e.into())
            }
        }
    }
}
