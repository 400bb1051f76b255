//! `reflow rebase` command - Start a rebase flow.

use anyhow::{Context, Result, bail};
use inquire::{Confirm, Select};
use reflow_core::RebaseFlowStep;
use reflow_git::CommitInfo;

use crate::commands::utils;
use crate::notifier::TerminalNotifier;
use crate::output;
use crate::services::RebaseFlowService;

/// Options for the rebase command.
#[derive(Debug)]
pub struct RebaseOptions<'a> {
    pub onto: Option<&'a str>,
    pub branch: Option<&'a str>,
    pub force: bool,
    pub yes: bool,
}

/// Run the rebase command.
pub fn run(opts: &RebaseOptions<'_>) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    utils::ensure_no_flow(&state)?;
    utils::ensure_on_branch(&repo)?;

    if repo.is_rebasing() {
        bail!("Git is already rebasing - finish or abort that rebase with git first");
    }
    repo.require_clean()?;

    let notifier = TerminalNotifier;
    let service = RebaseFlowService::new(&repo, &state, &notifier);

    let step = service.begin(opts.onto)?;
    let RebaseFlowStep::ChooseBranch { current_branch, .. } = &step else {
        bail!("Rebase flow did not open at branch selection");
    };
    let target = opts.branch.unwrap_or(current_branch).to_string();

    let base = match opts.onto {
        Some(base) => Ok(base.to_string()),
        None => select_base(&step, &target),
    };
    let confirmed = base.and_then(|base| {
        output::info(&format!("Rebasing '{target}' onto '{base}'..."));
        Ok(service.confirm_branches(&base, &target, opts.force)?)
    });
    let step = match confirmed {
        Ok(step) => step,
        Err(e) => {
            service.request_abort()?;
            return Err(e);
        }
    };

    if let RebaseFlowStep::WarnForcePush { commits, .. } = &step {
        print_remote_commits(&target, commits);
        let accepted = opts.yes || confirm_rewrite();
        if !accepted {
            service.request_abort()?;
            output::info("Rebase cancelled");
            return Ok(());
        }
        service.accept_force_push_warning()?;
    }

    let step = service.execute()?;
    utils::print_step(&service, &step)?;
    if step.is_completed() {
        utils::print_force_push_hint(&state, &target)?;
    }
    Ok(())
}

/// Ask for the base branch, recent branches first.
fn select_base(step: &RebaseFlowStep, target: &str) -> Result<String> {
    let RebaseFlowStep::ChooseBranch {
        all_branches,
        default_branch,
        recent_branches,
        initial_branch,
        ..
    } = step
    else {
        bail!("Rebase flow is not at branch selection");
    };

    let mut choices: Vec<String> = recent_branches
        .iter()
        .filter(|b| *b != target)
        .cloned()
        .collect();
    for branch in all_branches {
        if branch != target && !choices.contains(branch) {
            choices.push(branch.clone());
        }
    }
    if choices.is_empty() {
        bail!("No other branch to rebase '{target}' onto");
    }

    let cursor = initial_branch
        .as_ref()
        .or(default_branch.as_ref())
        .and_then(|preferred| choices.iter().position(|b| b == preferred))
        .unwrap_or(0);

    Select::new(&format!("Rebase '{target}' onto:"), choices)
        .with_starting_cursor(cursor)
        .with_help_message("Recently checked out branches are listed first")
        .prompt()
        .context("Branch selection cancelled")
}

fn print_remote_commits(target: &str, commits: &[CommitInfo]) {
    output::warn(&format!(
        "The upstream of '{target}' has {} commit(s) missing from the new base:",
        commits.len()
    ));
    for commit in commits {
        let short = commit.id.get(..7).unwrap_or(&commit.id);
        output::detail(&format!("  {short} {}", commit.summary));
    }
    output::detail("  Force pushing the rebased branch will drop them from the remote.");
}

/// A cancelled or unavailable prompt counts as no.
fn confirm_rewrite() -> bool {
    Confirm::new("Rebase anyway?")
        .with_default(false)
        .prompt()
        .unwrap_or(false)
}
