//! `reflow push` command - Push the current branch, forcing after a rebase.

use anyhow::{Context, Result};
use inquire::Confirm;

use crate::commands::utils;
use crate::output;
use crate::services::RemoteService;

/// Run the push command.
pub fn run(yes: bool) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    utils::ensure_on_branch(&repo)?;
    utils::ensure_no_flow(&state)?;

    let branch = repo.current_branch()?;
    let service = RemoteService::new(&repo, &state);
    let plan = service.plan_push(&branch)?;

    if plan.force {
        output::warn(&format!(
            "'{branch}' was rebased - pushing overwrites '{}/{branch}'",
            plan.remote
        ));
        let confirm = state.load_config()?.rebase.confirm_force_push;
        if confirm && !yes && !confirm_force_push()? {
            output::info("Push cancelled");
            return Ok(());
        }
    }

    output::info(&format!("Running {}...", plan.descriptor()));
    service.push(&plan)?;
    output::success(&format!("Pushed '{branch}'"));
    Ok(())
}

fn confirm_force_push() -> Result<bool> {
    Confirm::new("Force push?")
        .with_default(false)
        .prompt()
        .context("Confirmation cancelled")
}
