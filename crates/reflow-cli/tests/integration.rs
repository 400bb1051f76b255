//! Integration tests for the reflow CLI.
//!
//! These tests drive the binary end-to-end against throwaway repositories.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;
use tempfile::TempDir;

/// Run git in `dir` and return trimmed stdout.
fn git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create a git repository in a temp directory.
fn setup_git_repo() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let dir = temp.path();

    git(dir, &["init"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "core.editor", "true"]);

    fs::write(dir.join("README.md"), "# Test Repo\n").expect("Failed to write README");
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", "Initial commit"]);

    // Rename branch to main (in case default is master)
    git(dir, &["branch", "-M", "main"]);

    temp
}

/// Write `content` to `file` and commit it.
fn commit_file(dir: &Path, file: &str, content: &str, msg: &str) {
    fs::write(dir.join(file), content).expect("Failed to write file");
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", msg]);
}

/// `feature` and `main` each add a commit touching different files.
fn setup_diverged(temp: &TempDir) {
    let dir = temp.path();
    git(dir, &["checkout", "-b", "feature"]);
    commit_file(dir, "feature.txt", "feature work\n", "Add feature");
    git(dir, &["checkout", "main"]);
    commit_file(dir, "main.txt", "main work\n", "Add main");
    git(dir, &["checkout", "feature"]);
}

/// `feature` and `main` change the same line of `shared.txt`.
fn setup_conflicting(temp: &TempDir) {
    let dir = temp.path();
    commit_file(dir, "shared.txt", "base\n", "Add shared");
    git(dir, &["checkout", "-b", "feature"]);
    commit_file(dir, "shared.txt", "feature\n", "Feature edits shared");
    git(dir, &["checkout", "main"]);
    commit_file(dir, "shared.txt", "main\n", "Main edits shared");
    git(dir, &["checkout", "feature"]);
}

/// `main` deletes `shared.txt` while `feature` edits it.
fn setup_modify_delete(temp: &TempDir) {
    let dir = temp.path();
    commit_file(dir, "shared.txt", "base\n", "Add shared");
    git(dir, &["checkout", "-b", "feature"]);
    commit_file(dir, "shared.txt", "feature\n", "Feature edits shared");
    git(dir, &["checkout", "main"]);
    git(dir, &["rm", "-q", "shared.txt"]);
    git(dir, &["commit", "-m", "Main deletes shared"]);
    git(dir, &["checkout", "feature"]);
}

fn is_rebasing(dir: &Path) -> bool {
    dir.join(".git/rebase-merge").exists() || dir.join(".git/rebase-apply").exists()
}

/// Helper to get reflow command.
fn reflow() -> Command {
    Command::new(env!("CARGO_BIN_EXE_reflow"))
}

fn reflow_in(temp: &TempDir) -> Command {
    let mut cmd = reflow();
    cmd.current_dir(temp);
    cmd
}

// ============================================================================
// Basic CLI tests
// ============================================================================

#[test]
fn test_version_flag() {
    reflow()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("reflow"));
}

#[test]
fn test_help_flag() {
    reflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rebase"))
        .stdout(predicate::str::contains("continue"))
        .stdout(predicate::str::contains("abort"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("retry"));
}

#[test]
fn test_no_subcommand_shows_help() {
    reflow()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_resolve_requires_a_side() {
    reflow().args(["resolve", "file.txt"]).assert().failure();
}

#[test]
fn test_completions_bash() {
    reflow()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reflow"));
}

#[test]
fn test_status_not_in_git_repo() {
    let temp = TempDir::new().unwrap();

    reflow_in(&temp)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("git repository"));
}

#[test]
fn test_status_without_flow() {
    let temp = setup_git_repo();

    reflow_in(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No rebase in progress"));
}

#[test]
fn test_status_json_without_flow() {
    let temp = setup_git_repo();

    let output = reflow_in(&temp)
        .args(["status", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["current_branch"], "main");
    assert!(json["step"].is_null());
    assert_eq!(json["needs_force_push"], false);
}

#[test]
fn test_continue_without_flow_fails() {
    let temp = setup_git_repo();

    reflow_in(&temp)
        .arg("continue")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rebase in progress"));
}

#[test]
fn test_abort_without_flow_fails() {
    let temp = setup_git_repo();

    reflow_in(&temp)
        .arg("abort")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rebase in progress"));
}

#[test]
fn test_retry_with_nothing_pending() {
    let temp = setup_git_repo();

    reflow_in(&temp)
        .arg("retry")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to retry"));
}

// ============================================================================
// Rebase
// ============================================================================

#[test]
fn test_rebase_clean() {
    let temp = setup_git_repo();
    setup_diverged(&temp);
    let dir = temp.path();

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebased 'feature' onto 'main'"));

    assert!(!is_rebasing(dir));
    assert_eq!(git(dir, &["rev-parse", "--abbrev-ref", "HEAD"]), "feature");
    // main is now an ancestor of feature
    git(dir, &["merge-base", "--is-ancestor", "main", "feature"]);
    assert!(dir.join("main.txt").exists());
    assert!(dir.join("feature.txt").exists());

    let output = reflow_in(&temp)
        .args(["status", "--json"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["step"].is_null());
    assert_eq!(json["needs_force_push"], true);
}

#[test]
fn test_rebase_other_branch_with_branch_flag() {
    let temp = setup_git_repo();
    setup_diverged(&temp);
    let dir = temp.path();
    git(dir, &["checkout", "main"]);

    reflow_in(&temp)
        .args(["rebase", "--onto", "main", "--branch", "feature"])
        .assert()
        .success();

    git(dir, &["merge-base", "--is-ancestor", "main", "feature"]);
}

#[test]
fn test_rebase_onto_missing_branch() {
    let temp = setup_git_repo();
    setup_diverged(&temp);

    reflow_in(&temp)
        .args(["rebase", "--onto", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    // The flow was cancelled, so a new one can start
    reflow_in(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No rebase in progress"));
}

#[test]
fn test_rebase_onto_itself() {
    let temp = setup_git_repo();
    setup_diverged(&temp);

    reflow_in(&temp)
        .args(["rebase", "--onto", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("onto itself"));
}

#[test]
fn test_rebase_refuses_dirty_tree() {
    let temp = setup_git_repo();
    setup_diverged(&temp);
    fs::write(temp.path().join("feature.txt"), "uncommitted\n").unwrap();

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("uncommitted changes"));
}

// ============================================================================
// Conflicts
// ============================================================================

#[test]
fn test_conflict_then_abort() {
    let temp = setup_git_repo();
    setup_conflicting(&temp);
    let dir = temp.path();
    let original = git(dir, &["rev-parse", "feature"]);

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shared.txt"));
    assert!(is_rebasing(dir));

    reflow_in(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("show-conflicts"));

    reflow_in(&temp)
        .arg("continue")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Resolve all conflicts"));

    // Nothing resolved yet, so no confirmation is needed
    reflow_in(&temp)
        .arg("abort")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebase aborted"));

    assert!(!is_rebasing(dir));
    assert_eq!(git(dir, &["rev-parse", "feature"]), original);
}

#[test]
fn test_conflict_resolve_and_continue() {
    let temp = setup_git_repo();
    setup_conflicting(&temp);
    let dir = temp.path();

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success();

    reflow_in(&temp)
        .args(["resolve", "shared.txt", "--theirs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reflow continue"));

    reflow_in(&temp)
        .arg("continue")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebased 'feature' onto 'main'"));

    assert!(!is_rebasing(dir));
    assert_eq!(fs::read_to_string(dir.join("shared.txt")).unwrap(), "feature\n");
    git(dir, &["merge-base", "--is-ancestor", "main", "feature"]);
}

#[test]
fn test_resolve_unknown_path_fails() {
    let temp = setup_git_repo();
    setup_conflicting(&temp);

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success();

    reflow_in(&temp)
        .args(["resolve", "README.md", "--ours"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a conflicted file"));
}

#[test]
fn test_abort_after_resolving_needs_confirmation() {
    let temp = setup_git_repo();
    setup_conflicting(&temp);
    let dir = temp.path();

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success();
    reflow_in(&temp)
        .args(["resolve", "shared.txt", "--ours"])
        .assert()
        .success();

    // Without a terminal the prompt cannot be answered, so the rebase is kept
    reflow_in(&temp)
        .arg("abort")
        .assert()
        .success()
        .stdout(predicate::str::contains("Abort cancelled"));
    assert!(is_rebasing(dir));

    reflow_in(&temp)
        .args(["abort", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebase aborted"));

    assert!(!is_rebasing(dir));
    assert_eq!(fs::read_to_string(dir.join("shared.txt")).unwrap(), "feature\n");
}

#[test]
fn test_modify_delete_conflict_stays_unresolved() {
    let temp = setup_git_repo();
    setup_modify_delete(&temp);
    let dir = temp.path();
    let original = git(dir, &["rev-parse", "feature"]);

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success();
    assert!(is_rebasing(dir));

    let output = reflow_in(&temp)
        .args(["status", "--json"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["conflicts"]["unresolved"], serde_json::json!(["shared.txt"]));
    assert_eq!(json["conflicts"]["resolved"], serde_json::json!([]));

    reflow_in(&temp)
        .arg("continue")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Resolve all conflicts"));
    assert!(is_rebasing(dir));

    // Nothing counts as resolved, so abort does not ask
    reflow_in(&temp)
        .arg("abort")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebase aborted"));

    assert!(!is_rebasing(dir));
    assert_eq!(git(dir, &["rev-parse", "feature"]), original);
}

#[test]
fn test_modify_delete_resolved_by_choice() {
    let temp = setup_git_repo();
    setup_modify_delete(&temp);
    let dir = temp.path();

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success();

    reflow_in(&temp)
        .args(["resolve", "shared.txt", "--theirs"])
        .assert()
        .success();

    reflow_in(&temp)
        .arg("continue")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebased 'feature' onto 'main'"));

    assert!(!is_rebasing(dir));
    assert_eq!(fs::read_to_string(dir.join("shared.txt")).unwrap(), "feature\n");
}

#[test]
fn test_dismiss_and_reopen_conflicts() {
    let temp = setup_git_repo();
    setup_conflicting(&temp);

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success();

    reflow_in(&temp)
        .arg("dismiss")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conflicts hidden"));

    reflow_in(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("hide-conflicts"));

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already in progress"));

    reflow_in(&temp)
        .arg("reopen")
        .assert()
        .success()
        .stdout(predicate::str::contains("shared.txt"));
}

#[test]
fn test_abort_from_hidden_conflicts() {
    let temp = setup_git_repo();
    setup_conflicting(&temp);
    let dir = temp.path();

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success();
    reflow_in(&temp).arg("dismiss").assert().success();

    reflow_in(&temp)
        .arg("abort")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebase aborted"));
    assert!(!is_rebasing(dir));
}

// ============================================================================
// Force push record, undo and forget
// ============================================================================

#[test]
fn test_undo_restores_original_tip() {
    let temp = setup_git_repo();
    setup_diverged(&temp);
    let dir = temp.path();
    let original = git(dir, &["rev-parse", "feature"]);

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success();
    assert_ne!(git(dir, &["rev-parse", "feature"]), original);

    reflow_in(&temp)
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 'feature'"));

    assert_eq!(git(dir, &["rev-parse", "feature"]), original);
    assert!(!dir.join("main.txt").exists());

    reflow_in(&temp)
        .arg("undo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rebase of 'feature' to undo"));
}

#[test]
fn test_push_after_rebase_forces_and_clears_record() {
    let temp = setup_git_repo();
    let remote = TempDir::new().unwrap();
    git(remote.path(), &["init", "--bare"]);

    let dir = temp.path();
    let remote_path = remote.path().to_str().unwrap();
    git(dir, &["remote", "add", "origin", remote_path]);
    git(dir, &["push", "origin", "main"]);
    setup_diverged(&temp);
    git(dir, &["push", "-u", "origin", "feature"]);

    // The upstream holds the old feature commit, which main lacks
    reflow_in(&temp)
        .args(["rebase", "--onto", "main", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebased 'feature' onto 'main'"))
        .stderr(predicate::str::contains("missing from the new base"));

    reflow_in(&temp)
        .args(["push", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pushed 'feature'"));

    assert_eq!(
        git(dir, &["rev-parse", "feature"]),
        git(remote.path(), &["rev-parse", "feature"])
    );

    let output = reflow_in(&temp)
        .args(["status", "--json"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["needs_force_push"], false);
}

#[test]
fn test_failed_fetch_is_offered_for_retry() {
    let temp = setup_git_repo();
    let dir = temp.path();
    git(dir, &["remote", "add", "origin", "/nonexistent/reflow-remote"]);

    reflow_in(&temp).arg("fetch").assert().failure();

    let output = reflow_in(&temp)
        .args(["status", "--json"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["pending_retry"], "fetch origin");

    reflow_in(&temp)
        .arg("retry")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Retrying: fetch origin"));
}

#[test]
fn test_forget_removes_state() {
    let temp = setup_git_repo();
    setup_conflicting(&temp);
    let dir = temp.path();

    reflow_in(&temp)
        .args(["rebase", "--onto", "main"])
        .assert()
        .success();
    assert!(dir.join(".git/reflow").exists());

    reflow_in(&temp).arg("forget").assert().success();
    assert!(!dir.join(".git/reflow").exists());
}
