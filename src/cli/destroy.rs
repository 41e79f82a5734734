//! Forget recorded resources.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::{Project, ProjectOptions};
use crate::resource::CloudConfigResource;

/// Delete the named resources (all configured resources when none are given).
#[derive(Args, Debug)]
pub struct DestroyCommand {
    /// Resources to destroy
    names: Vec<String>,
}

impl DestroyCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Unknown names and state file failures.
    pub async fn execute(self, options: &ProjectOptions) -> Result<()> {
        let project = Project::open(options)?;
        let names = project.manifest.select(&self.names)?;
        let mut states = project.load_state()?;
        let resource = CloudConfigResource::new();

        for name in names {
            if !states.contains(name) {
                println!("  {name}: not provisioned");
                continue;
            }

            let mut state = states.get(name);
            resource.delete(&mut state);
            states.set(name, state);
            project.save_state(&states)?;
            println!("{} {name}: destroyed", "✓".green());
        }

        Ok(())
    }
}
