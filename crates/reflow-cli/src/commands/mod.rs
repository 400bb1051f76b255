//! CLI command definitions and handlers.

pub mod abort;
pub mod completions;
pub mod conflicts;
pub mod continue_rebase;
pub mod forget;
pub mod push;
pub mod rebase;
pub mod resolve;
pub mod retry;
pub mod status;
pub mod sync;
pub mod undo;
pub mod utils;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Reflow - rebase flows that survive conflicts.
#[derive(Parser)]
#[command(name = "reflow")]
#[command(author, version, about = "Rebase flows that survive conflicts, aborts and force pushes")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Only print errors and essential output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log flow transitions and git calls to stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebase a branch onto another branch.
    ///
    /// Without --onto, pick the base interactively from recent and local
    /// branches.
    Rebase {
        /// Branch to rebase onto.
        #[arg(long)]
        onto: Option<String>,

        /// Branch to rebase (defaults to the current branch).
        #[arg(short, long)]
        branch: Option<String>,

        /// Skip the check for upstream commits missing from the base.
        #[arg(long)]
        force: bool,

        /// Answer yes to the force push warning.
        #[arg(short, long)]
        yes: bool,
    },

    /// Continue a rebase after resolving conflicts.
    Continue,

    /// Abort the rebase in progress.
    Abort {
        /// Skip the confirmation when resolutions would be lost.
        #[arg(short, long)]
        yes: bool,
    },

    /// Choose a side for a conflicted file.
    Resolve {
        /// Path of the conflicted file, relative to the repository root.
        path: String,

        /// Keep the version of the branch being rebased onto.
        #[arg(long, conflicts_with = "theirs", required_unless_present = "theirs")]
        ours: bool,

        /// Keep the version of the commit being replayed.
        #[arg(long)]
        theirs: bool,
    },

    /// Hide the conflicts and keep working; the rebase stays paused.
    Dismiss,

    /// Show hidden conflicts again.
    Reopen,

    /// Show the state of the rebase flow.
    #[command(alias = "st")]
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Push the current branch, forcing when it was rebased.
    Push {
        /// Skip the force push confirmation.
        #[arg(short, long)]
        yes: bool,
    },

    /// Pull the current branch from the default remote.
    Pull,

    /// Fetch from the default remote.
    Fetch,

    /// Retry the last failed operation.
    Retry,

    /// Reset a rebased branch to its tip before the rebase.
    Undo {
        /// Branch to restore (defaults to the current branch).
        branch: Option<String>,
    },

    /// Delete all reflow state stored for this repository.
    Forget,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}
