//! Persisted resource state (`cloudconfig.state.toml`).
//!
//! The state file is the host's bookkeeping record: for every provisioned resource it keeps the
//! identity and the rendered document, so later runs can tell whether the configuration
//! drifted.
//!
//! ```toml
//! version = 1
//!
//! [resources.web]
//! id = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
//! rendered = "hello world"
//! ```
//!
//! A missing or empty file is an empty state. Writes go through
//! [`atomic_write`](crate::utils::fs::atomic_write).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::CloudConfigError;
use crate::resource::ResourceState;
use crate::utils::fs::atomic_write;

/// Name of the state file, next to the project file.
pub const STATE_FILE: &str = "cloudconfig.state.toml";

/// Format version written to new state files.
pub const STATE_VERSION: u32 = 1;

/// Contents of the state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    /// Format version
    pub version: u32,

    /// Recorded resources by name
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

impl StateFile {
    /// Empty state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            version: STATE_VERSION,
            resources: BTreeMap::new(),
        }
    }

    /// Default state path for a project file.
    #[must_use]
    pub fn default_path(manifest_path: &Path) -> PathBuf {
        manifest_path.parent().map_or_else(|| PathBuf::from(STATE_FILE), |dir| dir.join(STATE_FILE))
    }

    /// Load the state file, treating a missing or empty file as empty state.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid TOML, or was written by a newer
    /// format version ([`CloudConfigError::StateParseError`]).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No state file at {}; starting empty", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read state file: {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let state: Self = toml::from_str(&content).map_err(|e| CloudConfigError::StateParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if state.version > STATE_VERSION {
            return Err(CloudConfigError::StateParseError {
                file: path.display().to_string(),
                reason: format!(
                    "state version {} is newer than the supported version {STATE_VERSION}",
                    state.version
                ),
            }
            .into());
        }

        Ok(state)
    }

    /// Write the state file atomically.
    ///
    /// # Errors
    ///
    /// Fails when serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = String::from("# Managed by cloudconfig - DO NOT EDIT\n");
        content.push_str(&toml::to_string_pretty(self).map_err(CloudConfigError::from)?);

        atomic_write(path, content.as_bytes())
            .with_context(|| format!("Cannot write state file: {}", path.display()))?;

        tracing::debug!("Saved state for {} resource(s) to {}", self.resources.len(), path.display());
        Ok(())
    }

    /// Recorded state for a resource, empty when none is recorded.
    #[must_use]
    pub fn get(&self, name: &str) -> ResourceState {
        self.resources.get(name).cloned().unwrap_or_default()
    }

    /// Record a resource's state; an empty state removes the record.
    pub fn set(&mut self, name: &str, state: ResourceState) {
        if state.is_empty() {
            self.resources.remove(name);
        } else {
            self.resources.insert(name.to_string(), state);
        }
    }

    /// Whether a resource has a record.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }
}
