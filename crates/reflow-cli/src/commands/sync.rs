//! `reflow pull` and `reflow fetch` commands.

use anyhow::Result;

use crate::commands::utils;
use crate::output;
use crate::services::RemoteService;

/// Pull the current branch from the default remote.
pub fn run_pull() -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    utils::ensure_on_branch(&repo)?;
    utils::ensure_no_flow(&state)?;

    let branch = repo.current_branch()?;
    let service = RemoteService::new(&repo, &state);
    let remote = service.default_remote()?;

    output::info(&format!("Pulling '{branch}' from '{remote}'..."));
    service.pull(&remote, &branch)?;
    output::success(&format!("Pulled '{branch}'"));
    Ok(())
}

/// Fetch from the default remote.
pub fn run_fetch() -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let service = RemoteService::new(&repo, &state);
    let remote = service.default_remote()?;

    output::info(&format!("Fetching '{remote}'..."));
    service.fetch(&remote)?;
    output::success(&format!("Fetched '{remote}'"));
    Ok(())
}
