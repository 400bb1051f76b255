//! `reflow resolve` command - Pick a side for a conflicted file.

use anyhow::Result;
use reflow_git::ResolutionChoice;

use crate::commands::utils;
use crate::notifier::TerminalNotifier;
use crate::output;
use crate::services::RebaseFlowService;

/// Run the resolve command.
pub fn run(path: &str, choice: ResolutionChoice) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let notifier = TerminalNotifier;
    let service = RebaseFlowService::new(&repo, &state, &notifier);

    let step = service.resolve(path, choice)?;
    output::success(&format!("'{path}' will use the {choice} version"));

    if let Some(conflict_state) = step.conflict_state() {
        let summary = service.conflict_summary(conflict_state)?;
        if summary.all_resolved() {
            output::detail("  All conflicts resolved - run `reflow continue`");
        } else {
            output::detail(&format!(
                "  {} conflict(s) left",
                summary.unresolved.len()
            ));
        }
    }
    Ok(())
}
