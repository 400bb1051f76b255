//! Status service: a read-only snapshot of the rebase flow.

use anyhow::Result;
use reflow_core::{ConflictSummary, RebaseFlowStep, StateStore};
use reflow_git::{GitOps, RebaseProgress};
use serde::Serialize;

/// Everything `reflow status` reports.
#[derive(Debug, Clone, Serialize)]
pub struct FlowStatus {
    pub current_branch: Option<String>,
    /// Active step name, `None` when no flow is active.
    pub step: Option<&'static str>,
    pub target_branch: Option<String>,
    pub base_branch: Option<String>,
    /// Conflicts exist but were dismissed.
    pub hidden: bool,
    pub progress: Option<RebaseProgress>,
    pub conflicts: Option<ConflictSummary>,
    pub needs_force_push: bool,
    pub pending_retry: Option<String>,
}

/// Service for reading flow status.
pub struct StatusService<'a, G: GitOps, S: StateStore> {
    repo: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> StatusService<'a, G, S> {
    /// Create a new status service.
    #[must_use]
    pub const fn new(repo: &'a G, state: &'a S) -> Self {
        Self { repo, state }
    }

    /// Compute the current status. Progress and conflicts come from live
    /// repository state.
    pub fn status(&self) -> Result<FlowStatus> {
        let step = self.state.load_flow_step()?;
        let current_branch = self.repo.current_branch().ok();

        let (target_branch, base_branch) = step.as_ref().map_or((None, None), branches_of);

        let conflicts = match step.as_ref().and_then(RebaseFlowStep::conflict_state) {
            Some(conflict_state) => Some(ConflictSummary::compute(
                &self.repo.working_directory_status()?,
                &conflict_state.manual_resolutions,
            )),
            None => None,
        };

        let record = self.state.load_force_push_record()?;
        let needs_force_push = current_branch
            .as_deref()
            .is_some_and(|b| record.needs_force_push(b));

        Ok(FlowStatus {
            current_branch,
            step: step.as_ref().map(RebaseFlowStep::name),
            target_branch,
            base_branch,
            hidden: matches!(step, Some(RebaseFlowStep::HideConflicts { .. })),
            progress: self.repo.rebase_progress(),
            conflicts,
            needs_force_push,
            pending_retry: self
                .state
                .load_failed_operation()?
                .map(|op| op.descriptor.describe()),
        })
    }
}

fn branches_of(step: &RebaseFlowStep) -> (Option<String>, Option<String>) {
    match step {
        RebaseFlowStep::ChooseBranch {
            current_branch,
            initial_branch,
            ..
        } => (Some(current_branch.clone()), initial_branch.clone()),
        RebaseFlowStep::ShowProgress { action } => (
            Some(action.target_branch().to_string()),
            Some(action.base_branch().to_string()),
        ),
        RebaseFlowStep::ShowConflicts { conflict_state }
        | RebaseFlowStep::ConfirmAbort { conflict_state }
        | RebaseFlowStep::HideConflicts { conflict_state } => (
            Some(conflict_state.target_branch.clone()),
            Some(conflict_state.base_branch.clone()),
        ),
        RebaseFlowStep::WarnForcePush {
            base_branch,
            target_branch,
            ..
        } => (Some(target_branch.clone()), Some(base_branch.clone())),
        RebaseFlowStep::Completed => (None, None),
    }
}
