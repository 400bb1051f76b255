//! `reflow retry` command - Re-run the last failed operation.

use anyhow::Result;
use chrono::Local;

use crate::commands::utils;
use crate::notifier::TerminalNotifier;
use crate::output;
use crate::services::{RebaseFlowService, RetryOutcome, RetryService};

/// Run the retry command.
pub fn run() -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let notifier = TerminalNotifier;
    let service = RetryService::new(&repo, &state, &notifier);

    let Some(failed) = service.pending()? else {
        output::info("Nothing to retry");
        return Ok(());
    };

    output::info(&format!(
        "Retrying: {} (failed {})",
        failed.descriptor,
        failed
            .failed_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
    ));

    match service.submit_retry(&failed.descriptor)? {
        RetryOutcome::Completed => output::success(&format!("Done: {}", failed.descriptor)),
        RetryOutcome::Rebase(step) => {
            let flow = RebaseFlowService::new(&repo, &state, &notifier);
            utils::print_step(&flow, &step)?;
        }
    }
    Ok(())
}
