//! Working directory status with conflict detail.

use std::collections::HashMap;
use std::fs;

use git2::{Status, StatusOptions};
use serde::Serialize;

use crate::Repository;
use crate::error::Result;

/// How a conflicted file can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictKind {
    /// Text conflict; resolved once no conflict markers remain.
    Markers { count: usize },
    /// Binary, deleted or otherwise unmarkable conflict; needs an explicit
    /// ours/theirs choice.
    Manual,
}

/// Status of a single path in the working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Conflicted { conflict: ConflictKind },
    New,
    Modified,
    Deleted,
    Renamed,
    Untracked,
}

impl FileStatus {
    /// Whether the index still records a conflict for this path.
    #[must_use]
    pub const fn is_conflicted(&self) -> bool {
        matches!(self, Self::Conflicted { .. })
    }
}

/// A path in the working directory together with its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingFile {
    pub path: String,
    pub status: FileStatus,
}

impl WorkingFile {
    #[must_use]
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

impl Repository {
    /// Read the working directory status, counting conflict markers in
    /// conflicted text files.
    ///
    /// # Errors
    /// Returns error if the status cannot be read.
    pub fn working_directory_status(&self) -> Result<Vec<WorkingFile>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = self.inner().statuses(Some(&mut opts))?;

        let mut kinds = self.conflict_kinds()?;
        let mut files = Vec::with_capacity(statuses.len());
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            let status = entry.status();
            let file_status = if status.is_conflicted() {
                FileStatus::Conflicted {
                    conflict: kinds.remove(path).unwrap_or(ConflictKind::Manual),
                }
            } else {
                classify(status)
            };
            files.push(WorkingFile::new(path, file_status));
        }

        Ok(files)
    }

    /// Paths the index still records as conflicted.
    ///
    /// # Errors
    /// Returns error if the status cannot be read.
    pub fn conflicting_files(&self) -> Result<Vec<String>> {
        Ok(self
            .working_directory_status()?
            .into_iter()
            .filter(|f| f.status.is_conflicted())
            .map(|f| f.path)
            .collect())
    }

    /// Classify every conflict recorded in the index.
    ///
    /// Only paths with both an "ours" and a "theirs" stage can carry
    /// markers; modify/delete and similar conflicts always need a choice.
    fn conflict_kinds(&self) -> Result<HashMap<String, ConflictKind>> {
        let mut index = self.inner().index()?;
        index.read(true)?;

        let mut kinds = HashMap::new();
        for conflict in index.conflicts()? {
            let conflict = conflict?;
            let Some(entry) = conflict
                .our
                .as_ref()
                .or(conflict.their.as_ref())
                .or(conflict.ancestor.as_ref())
            else {
                continue;
            };
            let path = String::from_utf8_lossy(&entry.path).into_owned();
            let kind = if conflict.our.is_some() && conflict.their.is_some() {
                self.marker_kind(&path)
            } else {
                ConflictKind::Manual
            };
            kinds.insert(path, kind);
        }

        Ok(kinds)
    }

    fn marker_kind(&self, path: &str) -> ConflictKind {
        let Some(workdir) = self.workdir() else {
            return ConflictKind::Manual;
        };
        // Missing or non-UTF-8 content cannot carry text markers
        match fs::read(workdir.join(path)) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => ConflictKind::Markers {
                    count: count_conflict_markers(&text),
                },
                Err(_) => ConflictKind::Manual,
            },
            Err(_) => ConflictKind::Manual,
        }
    }
}

fn classify(status: Status) -> FileStatus {
    if status.intersects(Status::WT_NEW) && !status.intersects(Status::INDEX_NEW) {
        FileStatus::Untracked
    } else if status.intersects(Status::INDEX_NEW) {
        FileStatus::New
    } else if status.intersects(Status::WT_DELETED | Status::INDEX_DELETED) {
        FileStatus::Deleted
    } else if status.intersects(Status::WT_RENAMED | Status::INDEX_RENAMED) {
        FileStatus::Renamed
    } else {
        FileStatus::Modified
    }
}

/// Count conflict marker lines (`<<<<<<<`, `=======`, `>>>>>>>`).
#[must_use]
pub fn count_conflict_markers(content: &str) -> usize {
    content
        .lines()
        .filter(|line| {
            line.starts_with("<<<<<<< ")
                || line.starts_with(">>>>>>> ")
                || *line == "======="
                || *line == "<<<<<<<"
                || *line == ">>>>>>>"
        })
        .count()
}
