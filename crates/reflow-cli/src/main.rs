//! Reflow CLI - rebase flows that survive conflicts.

use clap::Parser;
use reflow_git::ResolutionChoice;
use tracing_subscriber::EnvFilter;

mod commands;
mod errors;
mod notifier;
mod output;
mod services;

use commands::{Cli, Commands};
use errors::ErrorChain;

fn main() {
    let cli = Cli::parse();

    output::set_quiet(cli.quiet);
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Rebase {
            onto,
            branch,
            force,
            yes,
        } => commands::rebase::run(&commands::rebase::RebaseOptions {
            onto: onto.as_deref(),
            branch: branch.as_deref(),
            force,
            yes,
        }),
        Commands::Continue => commands::continue_rebase::run(),
        Commands::Abort { yes } => commands::abort::run(yes),
        Commands::Resolve { path, ours, .. } => {
            let choice = if ours {
                ResolutionChoice::Ours
            } else {
                ResolutionChoice::Theirs
            };
            commands::resolve::run(&path, choice)
        }
        Commands::Dismiss => commands::conflicts::run_dismiss(),
        Commands::Reopen => commands::conflicts::run_reopen(),
        Commands::Status { json } => commands::status::run(json),
        Commands::Push { yes } => commands::push::run(yes),
        Commands::Pull => commands::sync::run_pull(),
        Commands::Fetch => commands::sync::run_fetch(),
        Commands::Retry => commands::retry::run(),
        Commands::Undo { branch } => commands::undo::run(branch.as_deref()),
        Commands::Forget => commands::forget::run(),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        ErrorChain::standard().dispatch(&e);
        std::process::exit(1);
    }
}

/// Log to stderr: warnings by default, debug with `--verbose`, `RUST_LOG`
/// overrides both.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
