//! Show pending changes without touching the state file.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::{Project, ProjectOptions};
use crate::resource::CloudConfigResource;

/// Exit code for `--detailed-exitcode` when changes are pending.
pub const CHANGES_PENDING_EXIT_CODE: i32 = 2;

/// Compare recorded state with the current configuration.
#[derive(Args, Debug)]
pub struct PlanCommand {
    /// Resources to check (all when none are given)
    names: Vec<String>,

    /// Exit with status 2 when any resource would be created or updated
    #[arg(long)]
    detailed_exitcode: bool,
}

impl PlanCommand {
    /// Run the command and return the exit code.
    ///
    /// # Errors
    ///
    /// Project loading failures and render failures of recorded resources.
    pub async fn execute(self, options: &ProjectOptions) -> Result<i32> {
        let project = Project::open(options)?;
        let names = project.manifest.select(&self.names)?;
        let states = project.load_state()?;
        let resource = CloudConfigResource::new();

        let (mut create, mut update, mut unchanged) = (0usize, 0usize, 0usize);

        for name in names {
            let config = project.manifest.resource_config(name)?;
            let state = states.get(name);

            if state.is_empty() {
                create += 1;
                println!("  {} {name} (create)", "+".green());
            } else if resource
                .exists(&config, &state)
                .with_context(|| format!("Failed to check resource '{name}'"))?
            {
                unchanged += 1;
                println!("    {name} (no changes)");
            } else {
                update += 1;
                println!("  {} {name} (update)", "~".yellow());
            }
        }

        println!("\nPlan: {create} to create, {update} to update, {unchanged} unchanged.");

        if self.detailed_exitcode && create + update > 0 {
            Ok(CHANGES_PENDING_EXIT_CODE)
        } else {
            Ok(0)
        }
    }
}
