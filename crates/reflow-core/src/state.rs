//! State persistence for the .git/reflow/ directory.

use std::fs;
use std::path::{Path, PathBuf};

use reflow_git::Repository;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::flow::RebaseFlowStep;
use crate::force_push::ForcePushRecord;
use crate::retry::FailedOperation;
use crate::traits::StateStore;

/// Manages the .git/reflow/ directory state of one repository.
#[derive(Debug, Clone)]
pub struct State {
    /// Path to the .git/reflow/ directory.
    reflow_dir: PathBuf,
}

impl State {
    /// File names within .git/reflow/
    const CONFIG_FILE: &'static str = "config.toml";
    const FLOW_FILE: &'static str = "flow.json";
    const FORCE_PUSH_FILE: &'static str = "force_push.json";
    const RETRY_FILE: &'static str = "retry.json";

    /// Create a new State instance for the given repository.
    ///
    /// A linked worktree's `.git` is a file pointing at its own git
    /// directory; state then lives there so each worktree tracks its own
    /// rebase.
    ///
    /// # Errors
    /// Returns error if the path is not the root of a repository.
    pub fn new(repo_path: impl AsRef<Path>) -> Result<Self> {
        let repo_path = repo_path.as_ref();
        let dot_git = repo_path.join(".git");

        let git_dir = if dot_git.is_dir() {
            dot_git
        } else if dot_git.is_file() {
            Repository::open(repo_path)
                .map_err(|_| Error::NotARepository)?
                .git_dir()
                .to_path_buf()
        } else {
            return Err(Error::NotARepository);
        };

        Ok(Self {
            reflow_dir: git_dir.join("reflow"),
        })
    }

    /// Create the .git/reflow/ directory if it is missing.
    ///
    /// # Errors
    /// Returns error if directory creation fails.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.reflow_dir)?;
        Ok(())
    }

    /// Get the path to the reflow directory.
    #[must_use]
    pub fn reflow_dir(&self) -> &Path {
        &self.reflow_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.reflow_dir.join(file)
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::StateParseError {
                file: path,
                message: e.to_string(),
            })
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(value)?;
        fs::write(self.path(file), content)?;
        Ok(())
    }

    fn remove(&self, file: &str) -> Result<()> {
        let path = self.path(file);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    // === Config operations ===

    /// Load the config, defaults when the file is missing.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read or parsed.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.path(Self::CONFIG_FILE))
    }

    /// Save the config.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save_config(&self, config: &Config) -> Result<()> {
        self.ensure_dir()?;
        config.save(self.path(Self::CONFIG_FILE))
    }

    // === Flow operations ===

    /// Check if a rebase flow is active.
    #[must_use]
    pub fn is_flow_active(&self) -> bool {
        self.path(Self::FLOW_FILE).exists()
    }

    /// Load the active flow step.
    ///
    /// # Errors
    /// Returns error if the flow file can't be read or parsed.
    pub fn load_flow_step(&self) -> Result<Option<RebaseFlowStep>> {
        self.read_json(Self::FLOW_FILE)
    }

    /// Save the active flow step. `Completed` removes the flow file.
    ///
    /// # Errors
    /// Returns error if serialization, write or removal fails.
    pub fn save_flow_step(&self, step: &RebaseFlowStep) -> Result<()> {
        debug!(step = step.name(), "saving flow step");
        if step.is_completed() {
            return self.clear_flow_step();
        }
        self.write_json(Self::FLOW_FILE, step)
    }

    /// Drop the active flow.
    ///
    /// # Errors
    /// Returns error if file removal fails.
    pub fn clear_flow_step(&self) -> Result<()> {
        self.remove(Self::FLOW_FILE)
    }

    // === Force push operations ===

    /// Load the force push record.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read or parsed.
    pub fn load_force_push_record(&self) -> Result<ForcePushRecord> {
        Ok(self.read_json(Self::FORCE_PUSH_FILE)?.unwrap_or_default())
    }

    /// Save the force push record. An empty record removes the file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save_force_push_record(&self, record: &ForcePushRecord) -> Result<()> {
        if record.is_empty() {
            return self.remove(Self::FORCE_PUSH_FILE);
        }
        self.write_json(Self::FORCE_PUSH_FILE, record)
    }

    // === Retry operations ===

    /// Load the last failed operation.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read or parsed.
    pub fn load_failed_operation(&self) -> Result<Option<FailedOperation>> {
        self.read_json(Self::RETRY_FILE)
    }

    /// Remember a failed operation.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save_failed_operation(&self, operation: &FailedOperation) -> Result<()> {
        self.write_json(Self::RETRY_FILE, operation)
    }

    /// Forget the last failed operation.
    ///
    /// # Errors
    /// Returns error if file removal fails.
    pub fn clear_failed_operation(&self) -> Result<()> {
        self.remove(Self::RETRY_FILE)
    }

    /// Delete the whole .git/reflow/ directory.
    ///
    /// # Errors
    /// Returns error if removal fails.
    pub fn clear_all(&self) -> Result<()> {
        if self.reflow_dir.exists() {
            fs::remove_dir_all(&self.reflow_dir)?;
        }
        Ok(())
    }
}

impl StateStore for State {
    fn reflow_dir(&self) -> &Path {
        Self::reflow_dir(self)
    }

    fn load_config(&self) -> Result<Config> {
        Self::load_config(self)
    }

    fn save_config(&self, config: &Config) -> Result<()> {
        Self::save_config(self, config)
    }

    fn is_flow_active(&self) -> bool {
        Self::is_flow_active(self)
    }

    fn load_flow_step(&self) -> Result<Option<RebaseFlowStep>> {
        Self::load_flow_step(self)
    }

    fn save_flow_step(&self, step: &RebaseFlowStep) -> Result<()> {
        Self::save_flow_step(self, step)
    }

    fn clear_flow_step(&self) -> Result<()> {
        Self::clear_flow_step(self)
    }

    fn load_force_push_record(&self) -> Result<ForcePushRecord> {
        Self::load_force_push_record(self)
    }

    fn save_force_push_record(&self, record: &ForcePushRecord) -> Result<()> {
        Self::save_force_push_record(self, record)
    }

    fn load_failed_operation(&self) -> Result<Option<FailedOperation>> {
        Self::load_failed_operation(self)
    }

    fn save_failed_operation(&self, operation: &FailedOperation) -> Result<()> {
        Self::save_failed_operation(self, operation)
    }

    fn clear_failed_operation(&self) -> Result<()> {
        Self::clear_failed_operation(self)
    }

    fn clear_all(&self) -> Result<()> {
        Self::clear_all(self)
    }
}
