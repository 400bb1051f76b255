//! `reflow dismiss` and `reflow reopen` commands - Hide or show conflicts.

use anyhow::Result;

use crate::commands::utils;
use crate::notifier::TerminalNotifier;
use crate::services::RebaseFlowService;

/// Hide the conflicts. The rebase stays paused.
pub fn run_dismiss() -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let notifier = TerminalNotifier;
    let service = RebaseFlowService::new(&repo, &state, &notifier);

    let step = service.dismiss_conflicts()?;
    utils::print_step(&service, &step)
}

/// Show hidden conflicts again.
pub fn run_reopen() -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let notifier = TerminalNotifier;
    let service = RebaseFlowService::new(&repo, &state, &notifier);

    let step = service.reopen_conflicts()?;
    utils::print_step(&service, &step)
}
