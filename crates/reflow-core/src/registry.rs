//! Repository-keyed access to [`State`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::state::State;

/// Per-repository state, created on first reference and cleared when the
/// repository is removed.
#[derive(Debug, Default)]
pub struct StateRegistry {
    states: HashMap<PathBuf, State>,
}

impl StateRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State for the repository at `repo_path`, creating its directory on
    /// first reference.
    ///
    /// # Errors
    /// Returns error if `repo_path` is not a repository or the state
    /// directory can't be created.
    pub fn state_for(&mut self, repo_path: impl AsRef<Path>) -> Result<&State> {
        match self.states.entry(repo_path.as_ref().to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let state = State::new(entry.key())?;
                state.ensure_dir()?;
                debug!(repo = %entry.key().display(), "state registered");
                Ok(entry.insert(state))
            }
        }
    }

    /// Whether state for `repo_path` has been referenced.
    #[must_use]
    pub fn contains(&self, repo_path: impl AsRef<Path>) -> bool {
        self.states.contains_key(repo_path.as_ref())
    }

    /// Repository removed: delete its stored state and forget it.
    ///
    /// # Errors
    /// Returns error if the state directory can't be removed.
    pub fn remove(&mut self, repo_path: impl AsRef<Path>) -> Result<()> {
        let key = repo_path.as_ref();
        let state = match self.states.remove(key) {
            Some(state) => state,
            None => match State::new(key) {
                Ok(state) => state,
                Err(_) => return Ok(()),
            },
        };
        debug!(repo = %key.display(), "state removed");
        state.clear_all()
    }
}
