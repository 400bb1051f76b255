use anyhow::{Context, Result, bail};
use reflow_core::{FlowNotifier, RebaseFlowStep, State, StateRegistry, StateStore};
use reflow_git::{GitOps, Repository};

use crate::output;
use crate::services::RebaseFlowService;

/// Helper to open repo and state.
pub fn open_repo_and_state() -> Result<(Repository, State)> {
    let repo = Repository::open_current().context("Not inside a git repository")?;
    let workdir = repo.workdir().context("Cannot run in bare repository")?;
    let mut registry = StateRegistry::new();
    let state = registry.state_for(workdir)?.clone();
    Ok((repo, state))
}

/// Ensure the repository is not in detached HEAD state.
pub fn ensure_on_branch(repo: &Repository) -> Result<()> {
    if repo.head_detached()? {
        return Err(reflow_git::Error::DetachedHead.into());
    }
    Ok(())
}

/// Refuse to start anything new while a rebase flow is active.
pub fn ensure_no_flow(state: &State) -> Result<()> {
    if state.is_flow_active() {
        bail!("A rebase is already in progress - run `reflow continue` or `reflow abort`");
    }
    Ok(())
}

/// Print what the user needs to see about `step`.
pub fn print_step<G: GitOps, S: StateStore, N: FlowNotifier>(
    service: &RebaseFlowService<'_, G, S, N>,
    step: &RebaseFlowStep,
) -> Result<()> {
    match step {
        RebaseFlowStep::ShowConflicts { conflict_state }
        | RebaseFlowStep::ConfirmAbort { conflict_state } => {
            if let Some(progress) = service.progress() {
                output::info(&output::progress_line(&progress));
            }
            let summary = service.conflict_summary(conflict_state)?;
            output::conflicts(&summary);
        }
        RebaseFlowStep::HideConflicts { .. } => {
            output::info("Conflicts hidden - run `reflow reopen` to show them again");
        }
        RebaseFlowStep::Completed => {}
        other => output::info(&format!("Rebase flow is at {other}")),
    }
    Ok(())
}

/// Remind the user that `branch` has to be force pushed.
pub fn print_force_push_hint(state: &State, branch: &str) -> Result<()> {
    if state.load_force_push_record()?.needs_force_push(branch) {
        output::detail(&format!(
            "  '{branch}' was rewritten - run `reflow push` to update the remote"
        ));
    }
    Ok(())
}
