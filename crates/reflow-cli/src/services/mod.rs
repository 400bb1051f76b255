//! Service layer for business logic with dependency injection.
//!
//! This module contains services that encapsulate business logic and accept
//! trait-based dependencies, enabling testing with mock implementations.

pub mod rebase;
pub mod remote;
pub mod retry;
pub mod status;
pub mod undo;

#[cfg(test)]
pub mod test_mocks;

pub use rebase::{FlowError, RebaseFlowService};
pub use remote::RemoteService;
pub use retry::{RetryOutcome, RetryService};
pub use status::{FlowStatus, StatusService};
pub use undo::UndoService;
