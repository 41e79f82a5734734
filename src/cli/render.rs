//! Print or write a resource's rendered output.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{Project, ProjectOptions};
use crate::resource::CloudConfigResource;
use crate::utils::fs::safe_write;

/// Run the pipeline for one resource without recording anything.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Resource to render
    name: String,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RenderCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Unknown resources and pipeline failures.
    pub async fn execute(self, options: &ProjectOptions) -> Result<()> {
        let project = Project::open(options)?;
        let config = project.manifest.resource_config(&self.name)?;
        let output = CloudConfigResource::new()
            .render(&config)
            .with_context(|| format!("Failed to render resource '{}'", self.name))?;

        match self.output {
            Some(path) => {
                safe_write(&path, &output.rendered)?;
                println!("{} Wrote {} ({})", "✓".green(), path.display(), output.id);
            }
            None => {
                print!("{}", output.rendered);
                if !output.rendered.ends_with('\n') {
                    println!();
                }
            }
        }

        Ok(())
    }
}
