//! Configuration management for reflow.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Reflow configuration loaded from .git/reflow/config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Rebase flow settings.
    #[serde(default)]
    pub rebase: RebaseConfig,
}

impl Config {
    /// Load config from a TOML file.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a TOML file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Remote used for push, pull, fetch and upstream lookups.
    #[serde(default = "default_remote")]
    pub default_remote: String,

    /// How many recently checked-out branches to offer when choosing a base.
    #[serde(default = "default_recent_branch_limit")]
    pub recent_branch_limit: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_remote: default_remote(),
            recent_branch_limit: default_recent_branch_limit(),
        }
    }
}

fn default_remote() -> String {
    "origin".into()
}

const fn default_recent_branch_limit() -> usize {
    5
}

/// Rebase flow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebaseConfig {
    /// Warn before rewriting a branch whose upstream has commits missing from
    /// the base, and confirm before force pushing.
    #[serde(default = "default_true")]
    pub confirm_force_push: bool,

    /// Fetch the default remote before starting a rebase so the upstream
    /// check sees current remote state.
    #[serde(default)]
    pub auto_fetch: bool,
}

impl Default for RebaseConfig {
    fn default() -> Self {
        Self {
            confirm_force_push: true,
            auto_fetch: false,
        }
    }
}

const fn default_true() -> bool {
    true
}
