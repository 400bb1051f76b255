//! `reflow forget` command - Drop every piece of stored state.

use anyhow::{Context, Result};
use reflow_core::StateRegistry;
use reflow_git::Repository;

use crate::output;

/// Run the forget command.
pub fn run() -> Result<()> {
    let repo = Repository::open_current().context("Not inside a git repository")?;
    let workdir = repo.workdir().context("Cannot run in bare repository")?;

    StateRegistry::new().remove(workdir)?;
    output::success("Forgot all reflow state for this repository");
    Ok(())
}
