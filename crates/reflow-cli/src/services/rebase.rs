//! Rebase flow service: the state machine that drives a rebase from branch
//! selection to completion.
//!
//! The service owns no state of its own. Every trigger loads the active step
//! from the [`StateStore`], validates the transition, talks to git through
//! [`GitOps`] and persists the next step, so a flow survives between process
//! invocations while the user resolves conflicts.

use anyhow::anyhow;
use reflow_core::{
    ConflictState, ConflictSummary, FailedOperation, FlowEvent, FlowNotifier, RebaseAction,
    RebaseFlowStep, RetryDescriptor, StateStore,
};
use reflow_git::{GitOps, RebaseOutcome, RebaseProgress, ResolutionChoice};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by the rebase flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// No flow is active for this repository.
    #[error("no rebase in progress")]
    NoActiveFlow,

    /// The trigger is not valid from the current step.
    #[error("cannot {action} while the rebase flow is at '{step}'")]
    InvalidTransition {
        step: &'static str,
        action: &'static str,
    },

    /// Conflicted paths still need a resolution.
    #[error("unresolved conflicts remain in: {}", .0.join(", "))]
    UnresolvedConflicts(Vec<String>),

    /// The rebase stopped but the repository holds no rebase conflict state.
    #[error("rebase of '{target_branch}' stopped without a rebase conflict state ({reason})")]
    MissingConflictState {
        target_branch: String,
        reason: &'static str,
    },

    /// The rebase finished but the repository is not on the rebased branch.
    #[error("rebase of '{target_branch}' finished but {reason}")]
    InvalidTipAfterCompletion {
        target_branch: String,
        reason: String,
    },

    /// Git failed to start, continue or abort the rebase.
    #[error("rebase failed")]
    Executor(#[source] reflow_git::Error),

    /// A general error occurred.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reflow_core::Error> for FlowError {
    fn from(err: reflow_core::Error) -> Self {
        Self::Other(err.into())
    }
}

impl From<reflow_git::Error> for FlowError {
    fn from(err: reflow_git::Error) -> Self {
        Self::Other(err.into())
    }
}

/// Result alias for flow triggers.
pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// Service driving the rebase flow with injected collaborators.
pub struct RebaseFlowService<'a, G: GitOps, S: StateStore, N: FlowNotifier> {
    repo: &'a G,
    state: &'a S,
    notifier: &'a N,
}

impl<'a, G: GitOps, S: StateStore, N: FlowNotifier> RebaseFlowService<'a, G, S, N> {
    /// Create a new rebase flow service.
    #[must_use]
    pub const fn new(repo: &'a G, state: &'a S, notifier: &'a N) -> Self {
        Self {
            repo,
            state,
            notifier,
        }
    }

    // === Step access ===

    /// The active step, `None` when there is no flow.
    pub fn current_step(&self) -> FlowResult<Option<RebaseFlowStep>> {
        Ok(self.state.load_flow_step()?)
    }

    /// Replace the active step. Setting `Completed` releases the flow.
    pub fn set_step(&self, step: &RebaseFlowStep) -> FlowResult<()> {
        self.state.save_flow_step(step)?;
        Ok(())
    }

    /// Progress of the rebase git is running, if any.
    #[must_use]
    pub fn progress(&self) -> Option<RebaseProgress> {
        self.repo.rebase_progress()
    }

    /// Resolved and unresolved conflicted paths, read from live status.
    pub fn conflict_summary(&self, conflict_state: &ConflictState) -> FlowResult<ConflictSummary> {
        let files = self.repo.working_directory_status()?;
        Ok(ConflictSummary::compute(
            &files,
            &conflict_state.manual_resolutions,
        ))
    }

    fn active_step(&self) -> FlowResult<RebaseFlowStep> {
        self.current_step()?.ok_or(FlowError::NoActiveFlow)
    }

    fn transition(&self, from: &RebaseFlowStep, to: RebaseFlowStep) -> FlowResult<RebaseFlowStep> {
        debug!(from = from.name(), to = to.name(), "flow transition");
        self.set_step(&to)?;
        Ok(to)
    }

    // === Branch selection ===

    /// Open a flow at `ChooseBranch` for the current branch.
    ///
    /// `initial_branch` preselects the base.
    pub fn begin(&self, initial_branch: Option<&str>) -> FlowResult<RebaseFlowStep> {
        let config = self.state.load_config()?;
        let remote = &config.general.default_remote;

        if config.rebase.auto_fetch {
            if let Err(e) = self.repo.fetch(remote) {
                warn!(remote = %remote, error = %e, "fetch before rebase failed");
            }
        }

        let current_branch = self.repo.current_branch()?;
        let recent_branches = self
            .repo
            .recent_branches(config.general.recent_branch_limit + 1)?
            .into_iter()
            .filter(|b| *b != current_branch)
            .take(config.general.recent_branch_limit)
            .collect();

        let step = RebaseFlowStep::ChooseBranch {
            all_branches: self.repo.list_branches()?,
            default_branch: self.repo.default_branch(remote),
            current_branch,
            recent_branches,
            initial_branch: initial_branch.map(String::from),
        };
        info!(step = step.name(), "rebase flow opened");
        self.set_step(&step)?;
        Ok(step)
    }

    /// The user picked `base` and `target`.
    ///
    /// Routes to `WarnForcePush` when the target's upstream has commits the
    /// base lacks, unless the check is disabled or `override_warning` is set.
    pub fn confirm_branches(
        &self,
        base: &str,
        target: &str,
        override_warning: bool,
    ) -> FlowResult<RebaseFlowStep> {
        let step = self.active_step()?;
        if !matches!(step, RebaseFlowStep::ChooseBranch { .. }) {
            return Err(invalid(&step, "choose branches"));
        }

        if base == target {
            return Err(anyhow!("Cannot rebase '{target}' onto itself").into());
        }
        for branch in [base, target] {
            if !self.repo.branch_exists(branch) {
                return Err(anyhow!("Branch '{branch}' does not exist").into());
            }
        }

        let config = self.state.load_config()?;
        if config.rebase.confirm_force_push && !override_warning {
            if let Some(commits) = self.remote_only_commits(base, target)? {
                info!(
                    target,
                    count = commits.len(),
                    "upstream has commits missing from base"
                );
                let next = RebaseFlowStep::WarnForcePush {
                    base_branch: base.to_string(),
                    target_branch: target.to_string(),
                    commits,
                };
                return self.transition(&step, next);
            }
        }

        let next = self.start_step(base, target)?;
        self.transition(&step, next)
    }

    /// The user accepted the force push warning.
    pub fn accept_force_push_warning(&self) -> FlowResult<RebaseFlowStep> {
        let step = self.active_step()?;
        let RebaseFlowStep::WarnForcePush {
            base_branch,
            target_branch,
            ..
        } = &step
        else {
            return Err(invalid(&step, "accept the force push warning"));
        };

        let next = self.start_step(base_branch, target_branch)?;
        self.transition(&step, next)
    }

    fn start_step(&self, base: &str, target: &str) -> FlowResult<RebaseFlowStep> {
        let original_branch_tip = self.repo.branch_commit(target)?.to_string();
        Ok(RebaseFlowStep::ShowProgress {
            action: RebaseAction::Start {
                base_branch: base.to_string(),
                target_branch: target.to_string(),
                original_branch_tip,
            },
        })
    }

    fn remote_only_commits(
        &self,
        base: &str,
        target: &str,
    ) -> FlowResult<Option<Vec<reflow_git::CommitInfo>>> {
        let Some(upstream) = self.repo.upstream_branch(target) else {
            return Ok(None);
        };
        let commits = self.repo.commits_in_range(base, &upstream)?;
        Ok(commits.filter(|c| !c.is_empty()))
    }

    // === Execution ===

    /// Run the action of a `ShowProgress` step and handle its outcome.
    pub fn execute(&self) -> FlowResult<RebaseFlowStep> {
        let step = self.active_step()?;
        let RebaseFlowStep::ShowProgress { action } = &step else {
            return Err(invalid(&step, "run the rebase"));
        };

        let result = match action {
            RebaseAction::Start {
                base_branch,
                target_branch,
                ..
            } => self.repo.start_rebase(base_branch, target_branch),
            RebaseAction::Continue { conflict_state } => {
                if let Some(progress) = self.repo.rebase_progress() {
                    debug!(
                        completed = progress.completed_commit_count,
                        total = progress.total_commit_count,
                        "continuing rebase"
                    );
                }
                self.repo.continue_rebase(&conflict_state.manual_resolutions)
            }
        };

        match result {
            Ok(RebaseOutcome::CompletedWithoutError { final_tip }) => {
                self.complete(&step, action, &final_tip.to_string())
            }
            Ok(RebaseOutcome::ConflictsEncountered { paths }) => {
                debug!(?paths, "rebase stopped on conflicts");
                self.stop_on_conflicts(&step, action)
            }
            Err(e) => {
                if let RebaseAction::Start {
                    base_branch,
                    target_branch,
                    ..
                } = action
                {
                    let descriptor = RetryDescriptor::Rebase {
                        base_branch: base_branch.clone(),
                        target_branch: target_branch.clone(),
                    };
                    self.state
                        .save_failed_operation(&FailedOperation::new(descriptor, e.to_string()))?;
                }
                self.abandon(&format!("rebase of '{}' failed", action.target_branch()))?;
                Err(FlowError::Executor(e))
            }
        }
    }

    fn complete(
        &self,
        step: &RebaseFlowStep,
        action: &RebaseAction,
        final_tip: &str,
    ) -> FlowResult<RebaseFlowStep> {
        let target = action.target_branch();

        let reason = if self.repo.is_rebasing() {
            Some("a rebase is still in progress".to_string())
        } else {
            match self.repo.current_branch() {
                Ok(branch) if branch == target => None,
                Ok(branch) => Some(format!("HEAD is on '{branch}'")),
                Err(e) => Some(e.to_string()),
            }
        };
        if let Some(reason) = reason {
            self.abandon(&format!(
                "rebase of '{target}' left the repository in an unexpected state"
            ))?;
            return Err(FlowError::InvalidTipAfterCompletion {
                target_branch: target.to_string(),
                reason,
            });
        }

        let mut record = self.state.load_force_push_record()?;
        if record.record_rewrite(target, action.original_branch_tip(), final_tip) {
            self.state.save_force_push_record(&record)?;
        }

        let next = self.transition(step, RebaseFlowStep::Completed)?;
        info!(target, base = action.base_branch(), "rebase completed");
        self.notifier.notify(FlowEvent::RebaseSucceeded {
            target_branch: target.to_string(),
            base_branch: action.base_branch().to_string(),
        });
        Ok(next)
    }

    fn stop_on_conflicts(
        &self,
        step: &RebaseFlowStep,
        action: &RebaseAction,
    ) -> FlowResult<RebaseFlowStep> {
        let target = action.target_branch();

        let missing = if self.repo.is_merging() {
            Some("the repository is in a merge")
        } else if !self.repo.is_rebasing() {
            Some("no rebase is in progress")
        } else {
            match self.repo.rebase_internal_state() {
                None => Some("rebase state is unreadable"),
                Some(internal) if internal.target_branch != target => {
                    Some("a different branch is being rebased")
                }
                Some(_) => None,
            }
        };
        if let Some(reason) = missing {
            self.abandon(&format!("conflict state for '{target}' is missing"))?;
            return Err(FlowError::MissingConflictState {
                target_branch: target.to_string(),
                reason,
            });
        }

        let conflict_state = match action {
            RebaseAction::Start {
                base_branch,
                target_branch,
                original_branch_tip,
            } => ConflictState::rebase(target_branch, base_branch, original_branch_tip),
            RebaseAction::Continue { conflict_state } => ConflictState {
                manual_resolutions: std::collections::BTreeMap::new(),
                ..conflict_state.clone()
            },
        };

        let next = self.transition(step, RebaseFlowStep::ShowConflicts { conflict_state })?;
        self.notifier.notify(FlowEvent::RebaseConflicts {
            target_branch: target.to_string(),
        });
        Ok(next)
    }

    // === Conflicts ===

    /// Record an explicit resolution for a conflicted path.
    pub fn resolve(&self, path: &str, choice: ResolutionChoice) -> FlowResult<RebaseFlowStep> {
        let step = self.active_step()?;
        let next = match step.clone() {
            RebaseFlowStep::ShowConflicts { mut conflict_state } => {
                self.record_resolution(&mut conflict_state, path, choice)?;
                RebaseFlowStep::ShowConflicts { conflict_state }
            }
            RebaseFlowStep::HideConflicts { mut conflict_state } => {
                self.record_resolution(&mut conflict_state, path, choice)?;
                RebaseFlowStep::HideConflicts { conflict_state }
            }
            _ => return Err(invalid(&step, "resolve conflicts")),
        };
        self.transition(&step, next)
    }

    fn record_resolution(
        &self,
        conflict_state: &mut ConflictState,
        path: &str,
        choice: ResolutionChoice,
    ) -> FlowResult<()> {
        let summary = self.conflict_summary(conflict_state)?;
        if !summary.contains(path) {
            return Err(anyhow!("'{path}' is not a conflicted file").into());
        }
        debug!(path, %choice, "resolution recorded");
        conflict_state.resolve(path, choice);
        Ok(())
    }

    /// The user resolved the conflicts and wants to continue.
    pub fn continue_rebase(&self) -> FlowResult<RebaseFlowStep> {
        let step = self.active_step()?;
        let RebaseFlowStep::ShowConflicts { conflict_state } = &step else {
            return Err(invalid(&step, "continue"));
        };

        let summary = self.conflict_summary(conflict_state)?;
        if !summary.all_resolved() {
            return Err(FlowError::UnresolvedConflicts(summary.unresolved));
        }

        let mut conflict_state = conflict_state.clone();
        conflict_state.user_has_resolved_conflicts = true;
        self.transition(
            &step,
            RebaseFlowStep::ShowProgress {
                action: RebaseAction::Continue { conflict_state },
            },
        )
    }

    /// Hide the conflicts; the flow stays active in the background.
    pub fn dismiss_conflicts(&self) -> FlowResult<RebaseFlowStep> {
        let step = self.active_step()?;
        let RebaseFlowStep::ShowConflicts { conflict_state } = &step else {
            return Err(invalid(&step, "dismiss conflicts"));
        };

        let target_branch = conflict_state.target_branch.clone();
        let next = self.transition(
            &step,
            RebaseFlowStep::HideConflicts {
                conflict_state: conflict_state.clone(),
            },
        )?;
        self.notifier
            .notify(FlowEvent::RebaseConflicts { target_branch });
        Ok(next)
    }

    /// Show previously dismissed conflicts again.
    pub fn reopen_conflicts(&self) -> FlowResult<RebaseFlowStep> {
        let step = self.active_step()?;
        let RebaseFlowStep::HideConflicts { conflict_state } = &step else {
            return Err(invalid(&step, "reopen conflicts"));
        };

        let conflict_state = conflict_state.clone();
        self.transition(&step, RebaseFlowStep::ShowConflicts { conflict_state })
    }

    // === Abort ===

    /// The user asked to abort.
    ///
    /// Aborts straight away when nothing was resolved yet, otherwise asks for
    /// confirmation first. Flows that never started a rebase are cancelled,
    /// and a `ShowProgress` step left behind by an interrupted run is
    /// discarded.
    pub fn request_abort(&self) -> FlowResult<RebaseFlowStep> {
        let step = self.active_step()?;
        match &step {
            RebaseFlowStep::ShowConflicts { conflict_state } => {
                let summary = self.conflict_summary(conflict_state)?;
                if summary.has_resolved() || conflict_state.user_has_resolved_conflicts {
                    let conflict_state = conflict_state.clone();
                    return self
                        .transition(&step, RebaseFlowStep::ConfirmAbort { conflict_state });
                }
                self.perform_abort(&step)
            }
            RebaseFlowStep::ChooseBranch { .. } | RebaseFlowStep::WarnForcePush { .. } => {
                info!(step = step.name(), "rebase flow cancelled");
                self.transition(&step, RebaseFlowStep::Completed)
            }
            RebaseFlowStep::ShowProgress { action } => {
                if self.repo.is_rebasing() {
                    self.repo.abort_rebase().map_err(FlowError::Executor)?;
                }
                self.abandon(&format!(
                    "interrupted rebase of '{}' was discarded",
                    action.target_branch()
                ))?;
                Ok(RebaseFlowStep::Completed)
            }
            RebaseFlowStep::ConfirmAbort { .. }
            | RebaseFlowStep::HideConflicts { .. }
            | RebaseFlowStep::Completed => Err(invalid(&step, "abort")),
        }
    }

    /// The user confirmed the abort.
    pub fn confirm_abort(&self) -> FlowResult<RebaseFlowStep> {
        let step = self.active_step()?;
        if !matches!(step, RebaseFlowStep::ConfirmAbort { .. }) {
            return Err(invalid(&step, "confirm abort"));
        }
        self.perform_abort(&step)
    }

    /// The user changed their mind about aborting.
    pub fn cancel_abort(&self) -> FlowResult<RebaseFlowStep> {
        let step = self.active_step()?;
        let RebaseFlowStep::ConfirmAbort { conflict_state } = &step else {
            return Err(invalid(&step, "cancel abort"));
        };

        let conflict_state = conflict_state.clone();
        self.transition(&step, RebaseFlowStep::ShowConflicts { conflict_state })
    }

    fn perform_abort(&self, step: &RebaseFlowStep) -> FlowResult<RebaseFlowStep> {
        if self.repo.is_rebasing() {
            self.repo.abort_rebase().map_err(FlowError::Executor)?;
        }
        info!("rebase aborted");
        self.transition(step, RebaseFlowStep::Completed)
    }

    /// Drop the flow without touching git and tell the application why.
    pub fn abandon(&self, reason: &str) -> FlowResult<()> {
        warn!(reason, "rebase flow abandoned");
        self.state.clear_flow_step()?;
        self.notifier.notify(FlowEvent::RebaseAbandoned {
            reason: reason.to_string(),
        });
        Ok(())
    }
}

fn invalid(step: &RebaseFlowStep, action: &'static str) -> FlowError {
    FlowError::InvalidTransition {
        step: step.name(),
        action,
    }
}
