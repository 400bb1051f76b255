//! # reflow-git
//!
//! Git execution layer for reflow, built on git2-rs and the `git`
//! executable. Provides branch queries, the rebase driver (start, continue,
//! abort), rebase progress, working directory status and remote operations.

mod error;
mod progress;
mod rebase;
mod remote;
mod repository;
mod status;
mod traits;

pub use error::{Error, Result};
pub use git2::Oid;
pub use progress::{RebaseProgress, read_rebase_progress};
pub use rebase::{
    RebaseExit, RebaseInternalState, RebaseOutcome, ResolutionChoice, classify_rebase_exit,
};
pub use remote::clone_repository;
pub use repository::{CommitInfo, Repository};
pub use status::{ConflictKind, FileStatus, WorkingFile, count_conflict_markers};
pub use traits::GitOps;
