//! Trait abstractions for state storage operations.
//!
//! This module defines the `StateStore` trait which abstracts the
//! per-repository state the rebase flow owns, enabling dependency injection
//! and testability.

use std::path::Path;

use crate::Result;
use crate::config::Config;
use crate::flow::RebaseFlowStep;
use crate::force_push::ForcePushRecord;
use crate::retry::FailedOperation;

/// Trait for state storage operations.
///
/// This trait abstracts state persistence, allowing for:
/// - Dependency injection in services
/// - Mock implementations for testing
#[allow(clippy::missing_errors_doc)]
pub trait StateStore {
    /// Get the path to the reflow directory.
    fn reflow_dir(&self) -> &Path;

    // === Config Operations ===

    /// Load the config from disk.
    fn load_config(&self) -> Result<Config>;

    /// Save the config to disk.
    fn save_config(&self, config: &Config) -> Result<()>;

    // === Flow Operations ===

    /// Check if a rebase flow is active.
    fn is_flow_active(&self) -> bool;

    /// Load the active flow step, `None` when there is no flow.
    fn load_flow_step(&self) -> Result<Option<RebaseFlowStep>>;

    /// Save the active flow step. Saving `Completed` releases the flow.
    fn save_flow_step(&self, step: &RebaseFlowStep) -> Result<()>;

    /// Drop the active flow, if any.
    fn clear_flow_step(&self) -> Result<()>;

    // === Force Push Operations ===

    /// Load the force push record (empty when never written).
    fn load_force_push_record(&self) -> Result<ForcePushRecord>;

    /// Save the force push record.
    fn save_force_push_record(&self, record: &ForcePushRecord) -> Result<()>;

    // === Retry Operations ===

    /// Load the last failed operation.
    fn load_failed_operation(&self) -> Result<Option<FailedOperation>>;

    /// Remember a failed operation, replacing the previous one.
    fn save_failed_operation(&self, operation: &FailedOperation) -> Result<()>;

    /// Forget the last failed operation.
    fn clear_failed_operation(&self) -> Result<()>;

    // === Lifecycle ===

    /// Remove everything stored for this repository.
    fn clear_all(&self) -> Result<()>;
}
