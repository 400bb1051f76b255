//! `reflow continue` command - Resume a rebase stopped on conflicts.

use anyhow::Result;
use reflow_core::RebaseFlowStep;

use crate::commands::utils;
use crate::notifier::TerminalNotifier;
use crate::output;
use crate::services::RebaseFlowService;

/// Run the continue command.
pub fn run() -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let notifier = TerminalNotifier;
    let service = RebaseFlowService::new(&repo, &state, &notifier);

    if let Some(RebaseFlowStep::HideConflicts { .. }) = service.current_step()? {
        service.reopen_conflicts()?;
    }

    let step = service.continue_rebase()?;
    let target = match &step {
        RebaseFlowStep::ShowProgress { action } => Some(action.target_branch().to_string()),
        _ => None,
    };
    output::info("Continuing rebase...");

    let step = service.execute()?;
    utils::print_step(&service, &step)?;
    if let Some(target) = target.filter(|_| step.is_completed()) {
        utils::print_force_push_hint(&state, &target)?;
    }
    Ok(())
}
