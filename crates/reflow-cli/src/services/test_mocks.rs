//! Mock implementations for testing services.
//!
//! These mocks implement the traits from reflow-git and reflow-core
//! to enable unit testing of service logic without real git repos.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};

use reflow_core::config::Config;
use reflow_core::{
    FailedOperation, FlowEvent, FlowNotifier, ForcePushRecord, RebaseFlowStep,
    Result as CoreResult, StateStore,
};
use reflow_git::{
    CommitInfo, GitOps, Oid, RebaseInternalState, RebaseOutcome, RebaseProgress,
    ResolutionChoice, Result as GitResult, WorkingFile,
};

/// Build a commit id from a single repeated hex digit.
#[allow(clippy::unwrap_used)]
pub fn oid(digit: char) -> Oid {
    Oid::from_str(&digit.to_string().repeat(40)).unwrap()
}

/// Mock implementation of `GitOps` for testing.
///
/// Rebase calls consume scripted outcomes in order and keep `is_rebasing`,
/// the current branch and the target's tip consistent with them.
pub struct MockGitOps {
    pub current_branch: RefCell<Option<String>>,
    pub branches: RefCell<HashMap<String, Oid>>,
    pub upstreams: RefCell<HashMap<String, String>>,
    pub ranges: RefCell<HashMap<(String, String), Vec<CommitInfo>>>,
    pub recent: RefCell<Vec<String>>,
    pub status: RefCell<Vec<WorkingFile>>,
    pub rebase_outcomes: RefCell<VecDeque<Result<RebaseOutcome, String>>>,
    pub is_rebasing: RefCell<bool>,
    pub is_merging: RefCell<bool>,
    pub rebase_target: RefCell<Option<String>>,
    pub rebase_state_missing: RefCell<bool>,
    pub detach_on_complete: RefCell<bool>,
    pub progress: RefCell<Option<RebaseProgress>>,
    pub remote_fails: RefCell<bool>,
    pub calls: RefCell<Vec<String>>,
}

impl Default for MockGitOps {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitOps {
    pub fn new() -> Self {
        Self {
            current_branch: RefCell::new(Some("main".to_string())),
            branches: RefCell::new(HashMap::new()),
            upstreams: RefCell::new(HashMap::new()),
            ranges: RefCell::new(HashMap::new()),
            recent: RefCell::new(vec![]),
            status: RefCell::new(vec![]),
            rebase_outcomes: RefCell::new(VecDeque::new()),
            is_rebasing: RefCell::new(false),
            is_merging: RefCell::new(false),
            rebase_target: RefCell::new(None),
            rebase_state_missing: RefCell::new(false),
            detach_on_complete: RefCell::new(false),
            progress: RefCell::new(None),
            remote_fails: RefCell::new(false),
            calls: RefCell::new(vec![]),
        }
    }

    pub fn with_branch(self, name: &str, oid: Oid) -> Self {
        self.branches.borrow_mut().insert(name.to_string(), oid);
        self
    }

    pub fn with_current_branch(self, name: &str) -> Self {
        *self.current_branch.borrow_mut() = Some(name.to_string());
        self
    }

    pub fn with_detached_head(self) -> Self {
        *self.current_branch.borrow_mut() = None;
        self
    }

    pub fn with_upstream(self, branch: &str, upstream: &str) -> Self {
        self.upstreams
            .borrow_mut()
            .insert(branch.to_string(), upstream.to_string());
        self
    }

    pub fn with_range(self, from: &str, to: &str, commits: Vec<CommitInfo>) -> Self {
        self.ranges
            .borrow_mut()
            .insert((from.to_string(), to.to_string()), commits);
        self
    }

    pub fn with_recent_branches(self, branches: &[&str]) -> Self {
        *self.recent.borrow_mut() = branches.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_rebase_outcome(self, outcome: Result<RebaseOutcome, String>) -> Self {
        self.rebase_outcomes.borrow_mut().push_back(outcome);
        self
    }

    /// A rebase of `target` is already stopped on conflicts.
    pub fn with_rebasing(self, target: &str) -> Self {
        *self.is_rebasing.borrow_mut() = true;
        *self.rebase_target.borrow_mut() = Some(target.to_string());
        self
    }

    pub fn with_merging(self) -> Self {
        *self.is_merging.borrow_mut() = true;
        self
    }

    pub fn without_rebase_state(self) -> Self {
        *self.rebase_state_missing.borrow_mut() = true;
        self
    }

    pub fn with_detach_on_complete(self) -> Self {
        *self.detach_on_complete.borrow_mut() = true;
        self
    }

    pub fn with_progress(self, progress: RebaseProgress) -> Self {
        *self.progress.borrow_mut() = Some(progress);
        self
    }

    pub fn with_remote_failure(self) -> Self {
        *self.remote_fails.borrow_mut() = true;
        self
    }

    pub fn set_status(&self, files: Vec<WorkingFile>) {
        *self.status.borrow_mut() = files;
    }

    /// Mutating calls made so far, e.g. `start main feature` or `abort`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn remote_result(&self, make: impl FnOnce(String) -> reflow_git::Error) -> GitResult<()> {
        if *self.remote_fails.borrow() {
            return Err(make("mock remote failure".to_string()));
        }
        Ok(())
    }

    fn next_outcome(&self) -> GitResult<RebaseOutcome> {
        let scripted = self
            .rebase_outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted rebase outcome".to_string()));

        match scripted {
            Ok(RebaseOutcome::CompletedWithoutError { final_tip }) => {
                *self.is_rebasing.borrow_mut() = false;
                if let Some(target) = self.rebase_target.borrow_mut().take() {
                    self.branches.borrow_mut().insert(target.clone(), final_tip);
                    *self.current_branch.borrow_mut() =
                        (!*self.detach_on_complete.borrow()).then_some(target);
                }
                Ok(RebaseOutcome::CompletedWithoutError { final_tip })
            }
            Ok(outcome @ RebaseOutcome::ConflictsEncountered { .. }) => {
                *self.is_rebasing.borrow_mut() = !*self.is_merging.borrow();
                Ok(outcome)
            }
            Err(message) => {
                *self.is_rebasing.borrow_mut() = false;
                Err(reflow_git::Error::RebaseFailed(message))
            }
        }
    }
}

impl GitOps for MockGitOps {
    fn workdir(&self) -> Option<&Path> {
        None
    }

    fn current_branch(&self) -> GitResult<String> {
        self.current_branch
            .borrow()
            .clone()
            .ok_or(reflow_git::Error::DetachedHead)
    }

    fn is_rebasing(&self) -> bool {
        *self.is_rebasing.borrow()
    }

    fn is_merging(&self) -> bool {
        *self.is_merging.borrow()
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.branches.borrow().contains_key(name)
    }

    fn list_branches(&self) -> GitResult<Vec<String>> {
        let mut branches: Vec<String> = self.branches.borrow().keys().cloned().collect();
        branches.sort();
        Ok(branches)
    }

    fn recent_branches(&self, limit: usize) -> GitResult<Vec<String>> {
        Ok(self.recent.borrow().iter().take(limit).cloned().collect())
    }

    fn default_branch(&self, _remote: &str) -> Option<String> {
        Some("main".to_string())
    }

    fn upstream_branch(&self, branch: &str) -> Option<String> {
        self.upstreams.borrow().get(branch).cloned()
    }

    fn checkout(&self, branch: &str) -> GitResult<()> {
        if !self.branch_exists(branch) {
            return Err(reflow_git::Error::BranchNotFound(branch.to_string()));
        }
        self.record(format!("checkout {branch}"));
        *self.current_branch.borrow_mut() = Some(branch.to_string());
        Ok(())
    }

    fn branch_commit(&self, branch: &str) -> GitResult<Oid> {
        self.branches
            .borrow()
            .get(branch)
            .copied()
            .ok_or_else(|| reflow_git::Error::BranchNotFound(branch.to_string()))
    }

    fn commits_in_range(&self, from: &str, to: &str) -> GitResult<Option<Vec<CommitInfo>>> {
        Ok(self
            .ranges
            .borrow()
            .get(&(from.to_string(), to.to_string()))
            .cloned())
    }

    fn reset_branch(&self, branch: &str, commit: Oid) -> GitResult<()> {
        self.record(format!("reset {branch} {commit}"));
        self.branches
            .borrow_mut()
            .insert(branch.to_string(), commit);
        Ok(())
    }

    fn working_directory_status(&self) -> GitResult<Vec<WorkingFile>> {
        Ok(self.status.borrow().clone())
    }

    fn start_rebase(&self, base: &str, target: &str) -> GitResult<RebaseOutcome> {
        self.record(format!("start {base} {target}"));
        *self.rebase_target.borrow_mut() = Some(target.to_string());
        self.next_outcome()
    }

    fn continue_rebase(
        &self,
        resolutions: &BTreeMap<String, ResolutionChoice>,
    ) -> GitResult<RebaseOutcome> {
        if !*self.is_rebasing.borrow() {
            return Err(reflow_git::Error::NoRebaseInProgress);
        }
        let applied: Vec<String> = resolutions
            .iter()
            .map(|(path, choice)| format!("{path}={choice}"))
            .collect();
        self.record(format!("continue {}", applied.join(",")));
        self.next_outcome()
    }

    fn abort_rebase(&self) -> GitResult<()> {
        self.record("abort".to_string());
        *self.is_rebasing.borrow_mut() = false;
        self.rebase_target.borrow_mut().take();
        Ok(())
    }

    fn rebase_progress(&self) -> Option<RebaseProgress> {
        if !*self.is_rebasing.borrow() {
            return None;
        }
        self.progress.borrow().clone()
    }

    fn rebase_internal_state(&self) -> Option<RebaseInternalState> {
        if !*self.is_rebasing.borrow() || *self.rebase_state_missing.borrow() {
            return None;
        }
        let target = self.rebase_target.borrow().clone()?;
        let original = self.branch_commit(&target).ok()?;
        Some(RebaseInternalState {
            target_branch: target,
            base_branch_tip: Oid::zero().to_string(),
            original_branch_tip: original.to_string(),
        })
    }

    fn push(&self, remote: &str, branch: &str, force: bool) -> GitResult<()> {
        self.record(format!(
            "push {remote} {branch}{}",
            if force { " --force" } else { "" }
        ));
        self.remote_result(reflow_git::Error::PushFailed)
    }

    fn fetch(&self, remote: &str) -> GitResult<()> {
        self.record(format!("fetch {remote}"));
        self.remote_result(reflow_git::Error::FetchFailed)
    }

    fn pull(&self, remote: &str, branch: &str) -> GitResult<()> {
        self.record(format!("pull {remote} {branch}"));
        self.remote_result(reflow_git::Error::PullFailed)
    }

    fn merge(&self, branch: &str) -> GitResult<()> {
        self.record(format!("merge {branch}"));
        Ok(())
    }

    fn cherry_pick(&self, commits: &[String]) -> GitResult<()> {
        self.record(format!("cherry-pick {}", commits.join(" ")));
        Ok(())
    }
}

/// Mock implementation of `StateStore` for testing.
pub struct MockStateStore {
    pub config: RefCell<Config>,
    pub reflow_dir: PathBuf,
    pub flow: RefCell<Option<RebaseFlowStep>>,
    pub record: RefCell<ForcePushRecord>,
    pub failed: RefCell<Option<FailedOperation>>,
}

impl Default for MockStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStateStore {
    pub fn new() -> Self {
        Self {
            config: RefCell::new(Config::default()),
            reflow_dir: std::env::temp_dir().join("mock-reflow"),
            flow: RefCell::new(None),
            record: RefCell::new(ForcePushRecord::new()),
            failed: RefCell::new(None),
        }
    }

    pub fn with_flow(self, step: RebaseFlowStep) -> Self {
        *self.flow.borrow_mut() = Some(step);
        self
    }

    pub fn with_force_push_record(self, record: ForcePushRecord) -> Self {
        *self.record.borrow_mut() = record;
        self
    }

    pub fn with_confirm_force_push(self, enabled: bool) -> Self {
        self.config.borrow_mut().rebase.confirm_force_push = enabled;
        self
    }

    pub fn with_failed_operation(self, operation: FailedOperation) -> Self {
        *self.failed.borrow_mut() = Some(operation);
        self
    }
}

impl StateStore for MockStateStore {
    fn reflow_dir(&self) -> &Path {
        &self.reflow_dir
    }

    fn load_config(&self) -> CoreResult<Config> {
        Ok(self.config.borrow().clone())
    }

    fn save_config(&self, config: &Config) -> CoreResult<()> {
        *self.config.borrow_mut() = config.clone();
        Ok(())
    }

    fn is_flow_active(&self) -> bool {
        self.flow.borrow().is_some()
    }

    fn load_flow_step(&self) -> CoreResult<Option<RebaseFlowStep>> {
        Ok(self.flow.borrow().clone())
    }

    fn save_flow_step(&self, step: &RebaseFlowStep) -> CoreResult<()> {
        *self.flow.borrow_mut() = (!step.is_completed()).then(|| step.clone());
        Ok(())
    }

    fn clear_flow_step(&self) -> CoreResult<()> {
        *self.flow.borrow_mut() = None;
        Ok(())
    }

    fn load_force_push_record(&self) -> CoreResult<ForcePushRecord> {
        Ok(self.record.borrow().clone())
    }

    fn save_force_push_record(&self, record: &ForcePushRecord) -> CoreResult<()> {
        *self.record.borrow_mut() = record.clone();
        Ok(())
    }

    fn load_failed_operation(&self) -> CoreResult<Option<FailedOperation>> {
        Ok(self.failed.borrow().clone())
    }

    fn save_failed_operation(&self, operation: &FailedOperation) -> CoreResult<()> {
        *self.failed.borrow_mut() = Some(operation.clone());
        Ok(())
    }

    fn clear_failed_operation(&self) -> CoreResult<()> {
        *self.failed.borrow_mut() = None;
        Ok(())
    }

    fn clear_all(&self) -> CoreResult<()> {
        *self.flow.borrow_mut() = None;
        *self.record.borrow_mut() = ForcePushRecord::new();
        *self.failed.borrow_mut() = None;
        Ok(())
    }
}

/// Notifier that keeps every event for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: RefCell<Vec<FlowEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        self.events.borrow().clone()
    }
}

impl FlowNotifier for RecordingNotifier {
    fn notify(&self, event: FlowEvent) {
        self.events.borrow_mut().push(event);
    }
}
