//! `reflow abort` command - Abandon the rebase and restore the branch.

use anyhow::Result;
use inquire::Confirm;
use reflow_core::RebaseFlowStep;

use crate::commands::utils;
use crate::notifier::TerminalNotifier;
use crate::output;
use crate::services::RebaseFlowService;

/// Run the abort command.
pub fn run(yes: bool) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let notifier = TerminalNotifier;
    let service = RebaseFlowService::new(&repo, &state, &notifier);

    if let Some(RebaseFlowStep::HideConflicts { .. }) = service.current_step()? {
        service.reopen_conflicts()?;
    }

    let step = match service.request_abort()? {
        RebaseFlowStep::ConfirmAbort { conflict_state } => {
            let summary = service.conflict_summary(&conflict_state)?;
            output::warn("Aborting discards the conflicts you already resolved:");
            for path in &summary.resolved {
                output::detail(&format!("  {path}"));
            }

            if yes || confirm_abort() {
                service.confirm_abort()?
            } else {
                service.cancel_abort()?;
                output::info("Abort cancelled - the rebase is still paused");
                return Ok(());
            }
        }
        other => other,
    };

    if step.is_completed() {
        output::success("Rebase aborted");
    }
    super::status::run(false)
}

/// A cancelled or unavailable prompt keeps the rebase.
fn confirm_abort() -> bool {
    Confirm::new("Abort the rebase?")
        .with_default(false)
        .prompt()
        .unwrap_or(false)
}
