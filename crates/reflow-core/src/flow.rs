//! Rebase flow model.
//!
//! A repository has at most one active [`RebaseFlowStep`]. The step is
//! persisted between invocations so a flow can sit in `ShowConflicts` or
//! `HideConflicts` for as long as the user needs.

use std::collections::BTreeMap;

use reflow_git::{CommitInfo, ResolutionChoice};
use serde::{Deserialize, Serialize};

/// The current step of a rebase flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum RebaseFlowStep {
    /// Pick the base to rebase the current branch onto.
    ChooseBranch {
        all_branches: Vec<String>,
        default_branch: Option<String>,
        current_branch: String,
        recent_branches: Vec<String>,
        initial_branch: Option<String>,
    },
    /// A start or continue is being executed.
    ShowProgress { action: RebaseAction },
    /// The rebase stopped on conflicts and they are shown to the user.
    ShowConflicts { conflict_state: ConflictState },
    /// The user asked to abort after resolving something.
    ConfirmAbort { conflict_state: ConflictState },
    /// The target's upstream has commits the base lacks.
    WarnForcePush {
        base_branch: String,
        target_branch: String,
        commits: Vec<CommitInfo>,
    },
    /// Conflicts exist but the user dismissed them.
    HideConflicts { conflict_state: ConflictState },
    /// Terminal. Saving this step releases the flow.
    Completed,
}

impl RebaseFlowStep {
    /// Short name used in logs and messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ChooseBranch { .. } => "choose-branch",
            Self::ShowProgress { .. } => "show-progress",
            Self::ShowConflicts { .. } => "show-conflicts",
            Self::ConfirmAbort { .. } => "confirm-abort",
            Self::WarnForcePush { .. } => "warn-force-push",
            Self::HideConflicts { .. } => "hide-conflicts",
            Self::Completed => "completed",
        }
    }

    /// The conflict state carried by this step, if any.
    #[must_use]
    pub const fn conflict_state(&self) -> Option<&ConflictState> {
        match self {
            Self::ShowConflicts { conflict_state }
            | Self::ConfirmAbort { conflict_state }
            | Self::HideConflicts { conflict_state } => Some(conflict_state),
            Self::ChooseBranch { .. }
            | Self::ShowProgress { .. }
            | Self::WarnForcePush { .. }
            | Self::Completed => None,
        }
    }

    /// Whether this is the terminal step.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for RebaseFlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Deferred operation executed while in `ShowProgress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RebaseAction {
    /// Begin rebasing `target_branch` onto `base_branch`.
    Start {
        base_branch: String,
        target_branch: String,
        original_branch_tip: String,
    },
    /// Continue after conflicts were resolved.
    Continue { conflict_state: ConflictState },
}

impl RebaseAction {
    /// Branch being rewritten.
    #[must_use]
    pub fn target_branch(&self) -> &str {
        match self {
            Self::Start { target_branch, .. } => target_branch,
            Self::Continue { conflict_state } => &conflict_state.target_branch,
        }
    }

    /// Branch being rebased onto.
    #[must_use]
    pub fn base_branch(&self) -> &str {
        match self {
            Self::Start { base_branch, .. } => base_branch,
            Self::Continue { conflict_state } => &conflict_state.base_branch,
        }
    }

    /// Tip of the target branch before this rebase began.
    #[must_use]
    pub fn original_branch_tip(&self) -> &str {
        match self {
            Self::Start {
                original_branch_tip,
                ..
            } => original_branch_tip,
            Self::Continue { conflict_state } => &conflict_state.original_branch_tip,
        }
    }
}

/// Which kind of operation left the conflicts behind. Only rebases are
/// tracked; merge conflicts are detected from the repository and abandon
/// the flow instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStateKind {
    Rebase,
}

/// Metadata about a rebase stopped on conflicts.
///
/// `original_branch_tip` is fixed for the whole rebase attempt; only
/// `manual_resolutions` and `user_has_resolved_conflicts` change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictState {
    pub kind: ConflictStateKind,
    pub target_branch: String,
    pub base_branch: String,
    pub original_branch_tip: String,
    #[serde(default)]
    pub manual_resolutions: BTreeMap<String, ResolutionChoice>,
    /// Set once the user has continued past an earlier conflicted commit of
    /// this rebase.
    #[serde(default)]
    pub user_has_resolved_conflicts: bool,
}

impl ConflictState {
    /// Conflict state for a rebase.
    #[must_use]
    pub fn rebase(
        target_branch: impl Into<String>,
        base_branch: impl Into<String>,
        original_branch_tip: impl Into<String>,
    ) -> Self {
        Self {
            kind: ConflictStateKind::Rebase,
            target_branch: target_branch.into(),
            base_branch: base_branch.into(),
            original_branch_tip: original_branch_tip.into(),
            manual_resolutions: BTreeMap::new(),
            user_has_resolved_conflicts: false,
        }
    }

    /// Record an explicit resolution for a path, replacing any earlier one.
    pub fn resolve(&mut self, path: impl Into<String>, choice: ResolutionChoice) {
        self.manual_resolutions.insert(path.into(), choice);
    }
}

/// Notifications emitted by the flow for the application layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FlowEvent {
    RebaseSucceeded {
        target_branch: String,
        base_branch: String,
    },
    /// Emitted whenever conflicts are pending, including after the user
    /// dismissed them, so a reminder can be shown.
    RebaseConflicts { target_branch: String },
    RebaseAbandoned { reason: String },
}

/// Sink for [`FlowEvent`]s.
pub trait FlowNotifier {
    /// Deliver one event.
    fn notify(&self, event: FlowEvent);
}
