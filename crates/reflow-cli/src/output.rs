//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use reflow_core::ConflictSummary;
use reflow_git::RebaseProgress;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print the detached HEAD error message with guidance (always to stderr).
pub fn error_detached_head() {
    error("Cannot rebase in detached HEAD state.");
    eprintln!();
    eprintln!("You are not on any branch. To fix this:");
    eprintln!("  1. Create a new branch: git checkout -b <branch-name>");
    eprintln!("  2. Or return to an existing branch: git checkout <branch-name>");
    eprintln!();
    eprintln!("Run `reflow status` after switching to a branch.");
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
///
/// Use for indented detail lines that accompany info or warn messages.
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential machine-readable output (always prints).
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Render rebase progress as `[####------] 2/5 summary`.
#[must_use]
pub fn progress_line(progress: &RebaseProgress) -> String {
    const WIDTH: usize = 20;

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = (progress.fraction() * WIDTH as f64).round() as usize;
    let bar = format!(
        "{}{}",
        "#".repeat(filled).green(),
        "-".repeat(WIDTH.saturating_sub(filled)).dimmed()
    );

    let mut line = format!(
        "[{bar}] {}/{}",
        progress.completed_commit_count, progress.total_commit_count
    );
    if let Some(summary) = &progress.current_commit_summary {
        line.push(' ');
        line.push_str(summary);
    }
    line
}

/// Print the conflicted paths, resolved ones first.
pub fn conflicts(summary: &ConflictSummary) {
    if is_quiet() {
        return;
    }
    for path in &summary.resolved {
        println!("  {} {}", "✓".green(), path);
    }
    for path in &summary.unresolved {
        println!("  {} {}", "✗".red(), path.red());
    }
}

/// Get a colored branch name with current indicator.
#[must_use]
pub fn branch_name(name: &str, is_current: bool) -> String {
    if is_current {
        format!("{} {}", "▶".cyan(), name.cyan().bold())
    } else {
        format!("  {name}")
    }
}

/// Print a horizontal line (suppressed in quiet mode).
pub fn hr() {
    if !is_quiet() {
        println!("{}", "─".repeat(50).dimmed());
    }
}
