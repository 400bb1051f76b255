//! Descriptors for operations that can be re-issued after a failure.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything needed to run one failed operation again with the same
/// arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetryDescriptor {
    Push {
        remote: String,
        branch: String,
        force: bool,
    },
    Pull {
        remote: String,
        branch: String,
    },
    Fetch {
        remote: String,
    },
    Clone {
        url: String,
        path: PathBuf,
        branch: Option<String>,
    },
    Checkout {
        branch: String,
    },
    Merge {
        branch: String,
    },
    CherryPick {
        target_branch: String,
        commits: Vec<String>,
    },
    Rebase {
        base_branch: String,
        target_branch: String,
    },
}

impl RetryDescriptor {
    /// One-line description for messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Push {
                remote,
                branch,
                force: true,
            } => format!("force push {branch} to {remote}"),
            Self::Push { remote, branch, .. } => format!("push {branch} to {remote}"),
            Self::Pull { remote, branch } => format!("pull {branch} from {remote}"),
            Self::Fetch { remote } => format!("fetch {remote}"),
            Self::Clone { url, path, .. } => format!("clone {url} into {}", path.display()),
            Self::Checkout { branch } => format!("checkout {branch}"),
            Self::Merge { branch } => format!("merge {branch}"),
            Self::CherryPick {
                target_branch,
                commits,
            } => format!(
                "cherry-pick {} commit(s) onto {target_branch}",
                commits.len()
            ),
            Self::Rebase {
                base_branch,
                target_branch,
            } => format!("rebase {target_branch} onto {base_branch}"),
        }
    }
}

impl std::fmt::Display for RetryDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// The most recent failed operation of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedOperation {
    pub descriptor: RetryDescriptor,
    pub failed_at: DateTime<Utc>,
    pub message: String,
}

impl FailedOperation {
    /// Record a failure that happened now.
    #[must_use]
    pub fn new(descriptor: RetryDescriptor, message: impl Into<String>) -> Self {
        Self {
            descriptor,
            failed_at: Utc::now(),
            message: message.into(),
        }
    }
}
