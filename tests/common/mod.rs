//! Common test utilities for cloudconfig integration tests
//!
//! Every test gets its own temporary project directory and runs the real binary in it.

// Not every suite uses every helper
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Environment variables that would leak the developer's setup into a test run
const ISOLATED_ENV: &[&str] = &["RUST_LOG", "CLOUDCONFIG_MANIFEST", "CLOUDCONFIG_STATE"];

/// Test project builder for creating test environments
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
}

impl TestProject {
    /// Create an empty project directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        fs::create_dir_all(&project_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    /// Get the project directory path
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// Path of the default state file
    pub fn state_path(&self) -> PathBuf {
        self.project_dir.join("cloudconfig.state.toml")
    }

    /// Write `cloudconfig.toml` to the project directory
    pub fn write_manifest(&self, content: &str) -> Result<()> {
        let manifest_path = self.project_dir.join("cloudconfig.toml");
        fs::write(&manifest_path, content)
            .with_context(|| format!("Failed to write manifest to {}", manifest_path.display()))?;
        Ok(())
    }

    /// Write a file relative to the project directory, creating parents
    pub fn write_file(&self, path: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.project_dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, content)?;
        Ok(file_path)
    }

    /// Read the state file, panicking when it is missing
    pub fn read_state(&self) -> String {
        let path = self.state_path();
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read state file {}: {}", path.display(), e))
    }

    /// Parse the state file as TOML
    pub fn state_toml(&self) -> toml::Table {
        toml::from_str(&self.read_state()).expect("state file is valid TOML")
    }

    /// `[resources.<name>]` from the state file, if recorded
    pub fn recorded(&self, name: &str) -> Option<toml::Table> {
        self.state_toml()
            .get("resources")
            .and_then(|resources| resources.get(name))
            .and_then(|record| record.as_table())
            .cloned()
    }

    /// A `Command` for the binary with a clean environment, run in the project directory
    pub fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_cloudconfig"));
        command.current_dir(&self.project_dir).env("NO_COLOR", "1");
        for var in ISOLATED_ENV {
            command.env_remove(var);
        }
        command
    }

    /// Run a cloudconfig command in the project directory
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.command().args(args).output().context("Failed to run cloudconfig command")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(self.success, "Command failed with code {:?}\nStderr: {}", self.code, self.stderr);
        self
    }

    /// Assert the command failed
    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    /// Assert the exit code
    pub fn assert_code(&self, code: i32) -> &Self {
        assert_eq!(self.code, Some(code), "Unexpected exit code\nStdout: {}\nStderr: {}", self.stdout, self.stderr);
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// Builder for `cloudconfig.toml` content
#[derive(Default)]
pub struct ManifestBuilder {
    tables: Vec<String>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource with an inline template
    pub fn inline(self, name: &str, template: &str, vars: &[(&str, &str)]) -> Self {
        self.resource(name, &format!("template = {}", toml_string(template)), vars, &[])
    }

    /// Add a resource with an inline template and extra settings such as `gzip = false`
    pub fn inline_with(self, name: &str, template: &str, vars: &[(&str, &str)], settings: &[&str]) -> Self {
        self.resource(name, &format!("template = {}", toml_string(template)), vars, settings)
    }

    /// Add a resource reading its template from a file
    pub fn file(self, name: &str, template_file: &str, vars: &[(&str, &str)]) -> Self {
        self.resource(name, &format!("template_file = {}", toml_string(template_file)), vars, &[])
    }

    fn resource(mut self, name: &str, source: &str, vars: &[(&str, &str)], settings: &[&str]) -> Self {
        let mut table = format!("[resources.{name}]\n{source}\n");
        for setting in settings {
            table.push_str(setting);
            table.push('\n');
        }
        if !vars.is_empty() {
            table.push_str(&format!("\n[resources.{name}.vars]\n"));
            for (key, value) in vars {
                table.push_str(&format!("{key} = {}\n", toml_string(value)));
            }
        }
        self.tables.push(table);
        self
    }

    pub fn build(self) -> String {
        self.tables.join("\n")
    }
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
