//! Force-push eligibility.
//!
//! For every branch whose history was rewritten, the record keeps the tip
//! the branch had *before* the rewrite. A branch with an entry needs a force
//! push; the entry goes away once that push has been issued.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Branch name (local, without `refs/heads/`) mapped to its pre-rewrite tip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForcePushRecord {
    branches: BTreeMap<String, String>,
}

impl ForcePushRecord {
    /// Create an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            branches: BTreeMap::new(),
        }
    }

    /// Record the outcome of a successful rewrite of `branch`.
    ///
    /// A rewrite that left the tip unchanged records nothing. Returns whether
    /// the record changed.
    pub fn record_rewrite(&mut self, branch: &str, original_tip: &str, final_tip: &str) -> bool {
        if original_tip == final_tip {
            debug!(branch, "tip unchanged, not marking for force push");
            return false;
        }
        let branch = local_name(branch);
        debug!(branch, original_tip, "marking branch for force push");
        self.branches
            .insert(branch.to_string(), original_tip.to_string());
        true
    }

    /// Whether pushing `branch` requires a force push.
    #[must_use]
    pub fn needs_force_push(&self, branch: &str) -> bool {
        self.branches.contains_key(local_name(branch))
    }

    /// The tip `branch` had before it was rewritten.
    #[must_use]
    pub fn original_tip(&self, branch: &str) -> Option<&str> {
        self.branches.get(local_name(branch)).map(String::as_str)
    }

    /// A force push of `branch` was issued; forget it. Returns the removed
    /// pre-rewrite tip.
    pub fn confirm_force_push(&mut self, branch: &str) -> Option<String> {
        self.branches.remove(local_name(branch))
    }

    /// Drop the entry for `branch` if its tip is back at the recorded value.
    /// Returns whether an entry was removed.
    pub fn reconcile(&mut self, branch: &str, current_tip: &str) -> bool {
        let branch = local_name(branch);
        if self.branches.get(branch).is_some_and(|tip| tip == current_tip) {
            self.branches.remove(branch);
            return true;
        }
        false
    }

    /// Iterate over `(branch, original_tip)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.branches
            .iter()
            .map(|(branch, tip)| (branch.as_str(), tip.as_str()))
    }

    /// Number of branches needing a force push.
    #[must_use]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Whether no branch needs a force push.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

fn local_name(branch: &str) -> &str {
    branch.strip_prefix("refs/heads/").unwrap_or(branch)
}
