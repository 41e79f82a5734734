//! Project loading shared by the commands.

use anyhow::Result;
use std::path::PathBuf;

use crate::manifest::{Manifest, find_manifest};
use crate::state::StateFile;

/// Where to find the project and state files.
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// Explicit project file
    pub manifest_path: Option<PathBuf>,
    /// Explicit state file
    pub state_path: Option<PathBuf>,
}

/// A loaded project file plus the location of its state file.
#[derive(Debug)]
pub struct Project {
    /// Path of `cloudconfig.toml`
    pub manifest_path: PathBuf,
    /// Parsed project file
    pub manifest: Manifest,
    /// Path of the state file
    pub state_path: PathBuf,
}

impl Project {
    /// Locate and load the project.
    ///
    /// # Errors
    ///
    /// Fails when no project file is found or it does not parse.
    pub fn open(options: &ProjectOptions) -> Result<Self> {
        let manifest_path = find_manifest(options.manifest_path.clone())?;
        let manifest = Manifest::load(&manifest_path)?;
        let state_path =
            options.state_path.clone().unwrap_or_else(|| StateFile::default_path(&manifest_path));

        tracing::debug!("Using project {} with state {}", manifest_path.display(), state_path.display());

        Ok(Self {
            manifest_path,
            manifest,
            state_path,
        })
    }

    /// Load the recorded state.
    ///
    /// # Errors
    ///
    /// Fails when the state file exists but cannot be parsed.
    pub fn load_state(&self) -> Result<StateFile> {
        StateFile::load(&self.state_path)
    }

    /// Persist the recorded state.
    ///
    /// # Errors
    ///
    /// Fails when the state file cannot be written.
    pub fn save_state(&self, state: &StateFile) -> Result<()> {
        state.save(&self.state_path)
    }
}
