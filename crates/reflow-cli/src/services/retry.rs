//! Retry service: re-issues a previously failed operation.

use anyhow::{Result, bail};
use reflow_core::{FailedOperation, FlowNotifier, RebaseFlowStep, RetryDescriptor, StateStore};
use reflow_git::GitOps;
use tracing::info;

use super::rebase::RebaseFlowService;
use super::remote::RemoteService;

/// What a retry ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The operation ran to completion.
    Completed,
    /// A rebase was re-entered; the flow is now at this step.
    Rebase(RebaseFlowStep),
}

/// Service for retrying failed operations.
pub struct RetryService<'a, G: GitOps, S: StateStore, N: FlowNotifier> {
    repo: &'a G,
    state: &'a S,
    notifier: &'a N,
}

impl<'a, G: GitOps, S: StateStore, N: FlowNotifier> RetryService<'a, G, S, N> {
    /// Create a new retry service.
    #[must_use]
    pub const fn new(repo: &'a G, state: &'a S, notifier: &'a N) -> Self {
        Self {
            repo,
            state,
            notifier,
        }
    }

    /// The last failed operation, if any.
    pub fn pending(&self) -> Result<Option<FailedOperation>> {
        Ok(self.state.load_failed_operation()?)
    }

    /// Re-issue exactly the operation `descriptor` describes.
    pub fn submit_retry(&self, descriptor: &RetryDescriptor) -> Result<RetryOutcome> {
        info!(operation = %descriptor, "retrying");
        let remote = RemoteService::new(self.repo, self.state);

        match descriptor {
            RetryDescriptor::Push {
                remote: name,
                branch,
                force,
            } => remote.push_branch(name, branch, *force)?,
            RetryDescriptor::Pull {
                remote: name,
                branch,
            } => remote.pull(name, branch)?,
            RetryDescriptor::Fetch { remote: name } => remote.fetch(name)?,
            RetryDescriptor::Clone { url, path, branch } => {
                remote.run_recorded(descriptor, || {
                    reflow_git::clone_repository(url, path, branch.as_deref())
                })?;
            }
            RetryDescriptor::Checkout { branch } => {
                remote.run_recorded(descriptor, || self.repo.checkout(branch))?;
            }
            RetryDescriptor::Merge { branch } => {
                remote.run_recorded(descriptor, || self.repo.merge(branch))?;
            }
            RetryDescriptor::CherryPick {
                target_branch,
                commits,
            } => {
                remote.run_recorded(descriptor, || {
                    self.repo.checkout(target_branch)?;
                    self.repo.cherry_pick(commits)
                })?;
            }
            RetryDescriptor::Rebase {
                base_branch,
                target_branch,
            } => return self.retry_rebase(base_branch, target_branch),
        }

        Ok(RetryOutcome::Completed)
    }

    fn retry_rebase(&self, base: &str, target: &str) -> Result<RetryOutcome> {
        if self.state.is_flow_active() {
            bail!("A rebase is already in progress - finish or abort it first");
        }
        self.state.clear_failed_operation()?;

        let flow = RebaseFlowService::new(self.repo, self.state, self.notifier);
        flow.begin(Some(base))?;
        let mut step = flow.confirm_branches(base, target, false)?;
        if matches!(step, RebaseFlowStep::ShowProgress { .. }) {
            step = flow.execute()?;
        }
        Ok(RetryOutcome::Rebase(step))
    }
}
