//! Print a resource's recorded state.

use anyhow::{Context, Result};
use clap::Args;

use super::{Project, ProjectOptions};
use crate::compression::decompress;

/// Show the recorded identity and output of one resource.
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Resource to show
    name: String,

    /// Decode gzip+base64 output before printing
    #[arg(long)]
    decode: bool,
}

impl ShowCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Unknown names, unreadable state, and output that cannot be decoded with `--decode`.
    pub async fn execute(self, options: &ProjectOptions) -> Result<()> {
        let project = Project::open(options)?;
        project.manifest.select(std::slice::from_ref(&self.name))?;
        let state = project.load_state()?.get(&self.name);

        if state.is_empty() {
            println!("{}: not provisioned", self.name);
            return Ok(());
        }

        let rendered = if self.decode {
            decompress(&state.rendered)
                .with_context(|| format!("Recorded output of '{}' is not gzip+base64", self.name))?
        } else {
            state.rendered
        };

        println!("id: {}", state.id);
        println!("rendered:");
        print!("{rendered}");
        if !rendered.ends_with('\n') {
            println!();
        }

        Ok(())
    }
}
