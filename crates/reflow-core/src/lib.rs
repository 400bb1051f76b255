//! # reflow-core
//!
//! Core library for reflow: the rebase flow model, conflict tracking,
//! force-push eligibility, retry descriptors and the per-repository state
//! stored under `.git/reflow/`.

pub mod config;
pub mod conflicts;
pub mod error;
pub mod flow;
pub mod force_push;
pub mod registry;
pub mod retry;
pub mod state;
pub mod traits;

pub use config::Config;
pub use conflicts::ConflictSummary;
pub use error::{Error, Result};
pub use flow::{
    ConflictState, ConflictStateKind, FlowEvent, FlowNotifier, RebaseAction, RebaseFlowStep,
};
pub use force_push::ForcePushRecord;
pub use registry::StateRegistry;
pub use retry::{FailedOperation, RetryDescriptor};
pub use state::State;
pub use traits::StateStore;
