//! Validate a document as cloud-config.
//!
//! ```bash
//! cloudconfig validate user-data.yaml
//! cloudconfig validate user-data.yaml --format json
//! ```
//!
//! Every entry fails the command, whatever its severity.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::utils::fs::read_text_file;
use crate::validation::{CloudConfigValidator, DocumentValidator, EntryKind};

/// Output format for validation results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors
    #[default]
    Text,
    /// JSON for tooling
    Json,
}

/// Check a document without a project file.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Document to validate
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl ValidateCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Unreadable files, validator invocation failures, and any reported entry.
    pub async fn execute(self) -> Result<()> {
        let document = read_text_file(&self.file)?;
        let report = CloudConfigValidator::new().validate(&document)?;

        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "file": self.file.display().to_string(),
                    "valid": report.is_empty(),
                    "entries": report.entries(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                for entry in report.entries() {
                    let kind = match entry.kind {
                        EntryKind::Error => entry.kind.to_string().red(),
                        EntryKind::Warning => entry.kind.to_string().yellow(),
                        EntryKind::Info => entry.kind.to_string().cyan(),
                    };
                    println!("line {}: {kind}: {}", entry.line, entry.message);
                }
                if report.is_empty() {
                    println!("{} {} is valid", "✓".green(), self.file.display());
                }
            }
        }

        if report.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("{}: {} problem(s) found", self.file.display(), report.len()))
        }
    }
}
