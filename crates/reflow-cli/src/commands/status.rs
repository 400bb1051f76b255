//! `reflow status` command - Show where the rebase flow stands.

use anyhow::Result;
use colored::Colorize;

use crate::commands::utils;
use crate::output;
use crate::services::{FlowStatus, StatusService};

/// Run the status command.
pub fn run(json: bool) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let status = StatusService::new(&repo, &state).status()?;

    if json {
        output::essential(&serde_json::to_string_pretty(&status)?);
    } else {
        print_status(&status);
    }
    Ok(())
}

fn print_status(status: &FlowStatus) {
    if let Some(branch) = &status.current_branch {
        output::detail(&output::branch_name(branch, true));
    }

    match status.step {
        None => output::info("No rebase in progress"),
        Some(step) => {
            let target = status.target_branch.as_deref().unwrap_or("?");
            let base = status.base_branch.as_deref().unwrap_or("?");
            output::info(&format!(
                "Rebasing '{}' onto '{}' ({step})",
                target.cyan(),
                base.cyan()
            ));
        }
    }

    if let Some(progress) = &status.progress {
        output::detail(&format!("  {}", output::progress_line(progress)));
    }

    if let Some(conflicts) = status.conflicts.as_ref().filter(|c| !c.is_empty()) {
        output::hr();
        output::conflicts(conflicts);
        if status.hidden {
            output::detail("  Conflicts are hidden - run `reflow reopen` to show them");
        } else if conflicts.all_resolved() {
            output::detail("  All conflicts resolved - run `reflow continue`");
        }
    }

    if status.needs_force_push {
        output::warn("Branch was rewritten - run `reflow push` to force push it");
    }
    if let Some(retry) = &status.pending_retry {
        output::warn(&format!("Last operation failed: {retry} - run `reflow retry`"));
    }
}
