//! Error types for reflow-git.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository.
    #[error("not a git repository")]
    NotARepository,

    /// Branch not found.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// Reference not found.
    #[error("reference not found: {0}")]
    RefNotFound(String),

    /// HEAD is detached (not on a branch).
    #[error("HEAD is detached - checkout a branch first")]
    DetachedHead,

    /// HEAD points at a branch with no commits yet.
    #[error("the current branch has no commits yet")]
    UnbornBranch,

    /// The git executable could not be started.
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    /// Rebase failed without leaving conflicts behind.
    #[error("rebase failed: {0}")]
    RebaseFailed(String),

    /// No rebase is in progress.
    #[error("no rebase in progress")]
    NoRebaseInProgress,

    /// Working directory is dirty.
    #[error("working directory has uncommitted changes")]
    DirtyWorkingDirectory,

    /// Remote not found.
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// Push failed.
    #[error("push failed: {0}")]
    PushFailed(String),

    /// Fetch failed.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// Pull failed.
    #[error("pull failed: {0}")]
    PullFailed(String),

    /// Any other git subcommand exited unsuccessfully.
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Filesystem error while reading repository state.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
