//! Create, refresh or update resources.
//!
//! For every selected resource:
//!
//! - no recorded state: **create**
//! - recorded state matches the current configuration: **read** (reported as unchanged)
//! - recorded state differs: **update**
//!
//! State is saved after each successful resource, so an apply that stops at a failing resource
//! keeps everything recorded before it.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::{Project, ProjectOptions};
use crate::resource::CloudConfigResource;

/// Apply the configuration of the named resources (all when none are given).
#[derive(Args, Debug)]
pub struct ApplyCommand {
    /// Resources to apply
    names: Vec<String>,
}

impl ApplyCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// The first resource failure, with the resource name as context.
    pub async fn execute(self, options: &ProjectOptions) -> Result<()> {
        let project = Project::open(options)?;
        let names = project.manifest.select(&self.names)?;
        let mut states = project.load_state()?;
        let resource = CloudConfigResource::new();

        for name in names {
            let config = project.manifest.resource_config(name)?;
            let mut state = states.get(name);

            let outcome = if state.is_empty() {
                resource
                    .create(&config, &mut state)
                    .with_context(|| format!("Failed to create resource '{name}'"))?;
                "created"
            } else if resource
                .exists(&config, &state)
                .with_context(|| format!("Failed to check resource '{name}'"))?
            {
                resource
                    .read(&config, &mut state)
                    .with_context(|| format!("Failed to read resource '{name}'"))?;
                "unchanged"
            } else {
                resource
                    .update(&config, &mut state)
                    .with_context(|| format!("Failed to update resource '{name}'"))?;
                "updated"
            };

            states.set(name, state);
            project.save_state(&states)?;
            println!("{} {name}: {outcome}", "✓".green());
        }

        Ok(())
    }
}
