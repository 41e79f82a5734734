//! Command-line interface for cloudconfig.
//!
//! The CLI drives the resource lifecycle the way a provisioning tool would, using
//! `cloudconfig.toml` for configuration and `cloudconfig.state.toml` for bookkeeping.
//!
//! # Available Commands
//!
//! - `apply` - create, refresh or update resources and record their state
//! - `plan` - report which resources would be created or updated
//! - `render` - print a resource's rendered output without recording it
//! - `validate` - check a document with the cloud-config validator
//! - `destroy` - forget recorded resources
//! - `show` - print a resource's recorded identity and output
//!
//! # Usage
//!
//! ```bash
//! cloudconfig plan --detailed-exitcode
//! cloudconfig apply web
//! cloudconfig show web --decode
//! cloudconfig --manifest-path infra/cloudconfig.toml destroy
//! ```
//!
//! # Logging
//!
//! Logs go to stderr at `info` by default, `debug` with `--verbose` and `error` with `--quiet`.
//! `RUST_LOG` takes precedence over all three.

mod apply;
mod common;
mod destroy;
mod plan;
mod render;
mod show;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use common::{Project, ProjectOptions};

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: Option<String>,
}

impl CliConfig {
    /// Create a configuration with no log level override.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber writing to stderr.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("info"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Render, validate and track cloud-config resources.
#[derive(Parser)]
#[command(
    name = "cloudconfig",
    about = "Render, validate and track CoreOS cloud-config resources",
    version,
    long_about = "cloudconfig renders cloud-config templates with variables, validates the output, \
                  optionally gzips it, and records a SHA-256 identity so configuration drift can be detected."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to cloudconfig.toml (default: search the current directory and its parents)
    #[arg(long, global = true, env = "CLOUDCONFIG_MANIFEST")]
    manifest_path: Option<PathBuf>,

    /// Path to the state file (default: cloudconfig.state.toml next to the project file)
    #[arg(long, global = true, env = "CLOUDCONFIG_STATE")]
    state_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, refresh or update resources and record their state
    Apply(apply::ApplyCommand),

    /// Show which resources would be created or updated
    Plan(plan::PlanCommand),

    /// Print a resource's rendered output without recording it
    Render(render::RenderCommand),

    /// Validate a document as cloud-config
    Validate(validate::ValidateCommand),

    /// Forget recorded resources
    Destroy(destroy::DestroyCommand),

    /// Print a resource's recorded identity and output
    Show(show::ShowCommand),
}

impl Cli {
    /// Execute the parsed command and return the process exit code.
    ///
    /// # Errors
    ///
    /// Any command failure, for display through
    /// [`user_friendly_error`](crate::core::user_friendly_error).
    pub async fn execute(self) -> Result<i32> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
        }
    }

    /// Execute with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Any command failure.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<i32> {
        config.init_logging();

        let options = ProjectOptions {
            manifest_path: self.manifest_path,
            state_path: self.state_path,
        };

        match self.command {
            Commands::Apply(cmd) => cmd.execute(&options).await.map(|()| 0),
            Commands::Plan(cmd) => cmd.execute(&options).await,
            Commands::Render(cmd) => cmd.execute(&options).await.map(|()| 0),
            Commands::Validate(cmd) => cmd.execute().await.map(|()| 0),
            Commands::Destroy(cmd) => cmd.execute(&options).await.map(|()| 0),
            Commands::Show(cmd) => cmd.execute(&options).await.map(|()| 0),
        }
    }
}
