//! `reflow undo` command - Restore a branch to its tip before the rebase.

use anyhow::Result;

use crate::commands::utils;
use crate::output;
use crate::services::UndoService;

/// Run the undo command.
pub fn run(branch: Option<&str>) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;

    let branch = match branch {
        Some(b) => b.to_string(),
        None => {
            utils::ensure_on_branch(&repo)?;
            repo.current_branch()?
        }
    };
    repo.require_clean()?;

    let result = UndoService::new(&repo, &state).restore(&branch)?;
    let short = result.restored_tip.get(..7).unwrap_or(&result.restored_tip);
    output::success(&format!("Restored '{}' to {short}", result.branch));
    Ok(())
}
