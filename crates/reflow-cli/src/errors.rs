//! Ordered error handler chain.
//!
//! Every command error is offered to each handler in turn until one reports
//! it. The last handler of the standard chain accepts everything, so an
//! error that falls off the end of a chain is a bug in the chain itself and
//! panics.

use reflow_git::Error as GitError;

use crate::output;
use crate::services::FlowError;

/// One link of the chain.
pub trait ErrorHandler {
    /// Report `err` and return `true`, or return `false` to pass it on.
    fn handle(&self, err: &anyhow::Error) -> bool;
}

/// Handlers tried in insertion order.
#[derive(Default)]
pub struct ErrorChain {
    handlers: Vec<Box<dyn ErrorHandler>>,
}

impl ErrorChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler.
    #[must_use]
    pub fn with(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Git guidance, then flow errors, then the catch-all.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(GitErrorHandler)
            .with(FlowErrorHandler)
            .with(DefaultErrorHandler)
    }

    /// Offer `err` to each handler until one reports it.
    ///
    /// # Panics
    /// Panics if no handler accepts the error.
    pub fn dispatch(&self, err: &anyhow::Error) {
        if self.handlers.iter().any(|h| h.handle(err)) {
            return;
        }
        panic!("error reached the end of the handler chain unhandled: {err:?}");
    }
}

/// Find the first error of type `E` in the cause chain.
///
/// `FlowError::Other` is transparent and hides its inner chain from
/// `source()`, so it is searched explicitly.
fn find_cause<E: std::error::Error + 'static>(err: &anyhow::Error) -> Option<&E> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<E>()
            .or_else(|| match cause.downcast_ref::<FlowError>() {
                Some(FlowError::Other(inner)) => find_cause::<E>(inner),
                _ => None,
            })
    })
}

/// Repository states the user has to fix by hand.
pub struct GitErrorHandler;

impl ErrorHandler for GitErrorHandler {
    fn handle(&self, err: &anyhow::Error) -> bool {
        let Some(git_err) = find_cause::<GitError>(err) else {
            return false;
        };

        match git_err {
            GitError::DetachedHead => output::error_detached_head(),
            GitError::UnbornBranch => {
                output::error("The current branch has no commits yet.");
                output::detail("  Create a first commit, then try again.");
            }
            GitError::DirtyWorkingDirectory => {
                output::error("Working directory has uncommitted changes.");
                output::detail("  Commit or stash them, then try again.");
            }
            GitError::NotARepository => {
                output::error("Not inside a git repository.");
            }
            GitError::NoRebaseInProgress => {
                output::error("Git has no rebase in progress.");
                output::detail("  Run `reflow abort` to discard the stale rebase flow.");
            }
            _ => return false,
        }
        true
    }
}

/// Errors raised by the rebase flow.
pub struct FlowErrorHandler;

impl ErrorHandler for FlowErrorHandler {
    fn handle(&self, err: &anyhow::Error) -> bool {
        let Some(flow_err) = find_cause::<FlowError>(err) else {
            return false;
        };

        match flow_err {
            FlowError::NoActiveFlow => {
                output::error("No rebase in progress.");
                output::detail("  Start one with `reflow rebase`.");
            }
            FlowError::InvalidTransition { .. } => {
                output::error(&flow_err.to_string());
                output::detail("  Run `reflow status` to see where the rebase stands.");
            }
            FlowError::UnresolvedConflicts(paths) => {
                output::error("Resolve all conflicts before continuing:");
                for path in paths {
                    output::detail(&format!("  {path}"));
                }
                output::detail("  Edit the files, or run `reflow resolve <path> --ours|--theirs`.");
            }
            FlowError::MissingConflictState { .. } | FlowError::InvalidTipAfterCompletion { .. } => {
                output::error(&flow_err.to_string());
                output::detail("  The rebase flow was abandoned. Inspect the repository with `git status`.");
            }
            FlowError::Executor(cause) => {
                output::error(&format!("Rebase failed: {cause}"));
                output::detail("  Run `reflow retry` once the problem is fixed.");
            }
            FlowError::Other(_) => return false,
        }
        true
    }
}

/// Catch-all: prints the error with its context.
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, err: &anyhow::Error) -> bool {
        output::error(&format!("{err:#}"));
        true
    }
}
