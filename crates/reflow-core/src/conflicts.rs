//! Conflict tracking over live working directory status.
//!
//! Nothing here is cached: the user can edit files at any time while a flow
//! is suspended, so callers pass a fresh status read on every decision.

use std::collections::BTreeMap;

use reflow_git::{ConflictKind, FileStatus, ResolutionChoice, WorkingFile};
use serde::Serialize;

/// Conflicted paths split into resolved and still-unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictSummary {
    pub resolved: Vec<String>,
    pub unresolved: Vec<String>,
}

impl ConflictSummary {
    /// Classify every conflicted path in `files`.
    ///
    /// A path is resolved when it has an explicit resolution choice, or when
    /// it is a text conflict with no conflict markers left. Conflicts that
    /// cannot carry markers stay unresolved until a choice is made.
    #[must_use]
    pub fn compute(
        files: &[WorkingFile],
        manual_resolutions: &BTreeMap<String, ResolutionChoice>,
    ) -> Self {
        let mut summary = Self::default();

        for file in files {
            let FileStatus::Conflicted { conflict } = file.status else {
                continue;
            };
            let resolved = manual_resolutions.contains_key(&file.path)
                || matches!(conflict, ConflictKind::Markers { count: 0 });

            if resolved {
                summary.resolved.push(file.path.clone());
            } else {
                summary.unresolved.push(file.path.clone());
            }
        }

        summary
    }

    /// Whether at least one conflicted path is already resolved.
    #[must_use]
    pub fn has_resolved(&self) -> bool {
        !self.resolved.is_empty()
    }

    /// Whether every conflicted path is resolved.
    #[must_use]
    pub fn all_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Whether `path` is one of the conflicted paths.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.resolved.iter().chain(&self.unresolved).any(|p| p == path)
    }

    /// Number of conflicted paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved.len() + self.unresolved.len()
    }

    /// Whether there are no conflicted paths at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
