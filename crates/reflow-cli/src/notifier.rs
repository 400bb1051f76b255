//! Flow notifications rendered on the terminal.

use reflow_core::{FlowEvent, FlowNotifier};

use crate::output;

/// Prints flow events as they happen.
pub struct TerminalNotifier;

impl FlowNotifier for TerminalNotifier {
    fn notify(&self, event: FlowEvent) {
        match event {
            FlowEvent::RebaseSucceeded {
                target_branch,
                base_branch,
            } => output::success(&format!("Rebased '{target_branch}' onto '{base_branch}'")),
            FlowEvent::RebaseConflicts { target_branch } => {
                output::warn(&format!("Rebase of '{target_branch}' is waiting on conflicts"));
                output::detail("  Resolve them, then run `reflow continue` (or `reflow abort`).");
            }
            FlowEvent::RebaseAbandoned { reason } => {
                output::warn(&format!("Rebase flow abandoned: {reason}"));
            }
        }
    }
}
