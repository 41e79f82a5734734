//! Project file parsing and validation.
//!
//! A project declares its cloud-config resources in `cloudconfig.toml`:
//!
//! ```toml
//! [resources.web]
//! template_file = "templates/web.yaml"
//! gzip = false
//!
//! [resources.web.vars]
//! hostname = "web-1"
//!
//! [resources.motd]
//! template = "#cloud-config\nwrite_files:\n  - path: /etc/motd\n    content: ${var.text}\n"
//! vars = { text = "hello" }
//! ```
//!
//! Each resource needs exactly one of `template` (inline text) or `template_file` (a path
//! relative to the project file). `gzip` is accepted as an alias of `compress`; both
//! `compress` and `validate` default to `true`. Variables are kept dynamically typed here so a
//! non-string value is reported by the renderer with its key and type.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::CloudConfigError;
use crate::resource::ResourceConfig;
use crate::templating::Variables;
use crate::utils::fs::{find_upwards, read_text_file};

/// Name of the project file.
pub const MANIFEST_FILE: &str = "cloudconfig.toml";

/// Parsed `cloudconfig.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Resources by name, in name order
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceSpec>,

    /// Directory holding the project file; template paths are relative to it
    #[serde(skip)]
    pub manifest_dir: Option<PathBuf>,
}

/// One `[resources.<name>]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceSpec {
    /// Inline template text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Template file, relative to the project file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_file: Option<PathBuf>,

    /// Gzip and base64-encode the output
    #[serde(default = "default_true", alias = "gzip")]
    pub compress: bool,

    /// Validate the rendered document
    #[serde(default = "default_true")]
    pub validate: bool,

    /// Template variables
    #[serde(default, alias = "variables")]
    pub vars: Variables,
}

const fn default_true() -> bool {
    true
}

impl Manifest {
    /// Load and validate a project file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid TOML for this format
    /// ([`CloudConfigError::ManifestParseError`]) or declares invalid resources
    /// ([`CloudConfigError::ManifestValidationError`]).
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_text_file(path)?;

        let mut manifest: Self = toml::from_str(&content).map_err(|e| CloudConfigError::ManifestParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;

        manifest.manifest_dir = Some(
            path.parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| anyhow::anyhow!("Project file path has no parent directory"))?,
        );

        manifest.validate()?;
        tracing::debug!("Loaded {} resource(s) from {}", manifest.resources.len(), path.display());

        Ok(manifest)
    }

    /// Check resource names and template sources.
    ///
    /// # Errors
    ///
    /// Returns [`CloudConfigError::ManifestValidationError`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        for (name, spec) in &self.resources {
            if !is_valid_resource_name(name) {
                return Err(CloudConfigError::ManifestValidationError {
                    reason: format!(
                        "Invalid resource name '{name}': use only letters, digits, '-' and '_'"
                    ),
                }
                .into());
            }

            match (&spec.template, &spec.template_file) {
                (Some(_), Some(_)) => {
                    return Err(CloudConfigError::ManifestValidationError {
                        reason: format!(
                            "Resource '{name}' sets both `template` and `template_file`; use one"
                        ),
                    }
                    .into());
                }
                (None, None) => {
                    return Err(CloudConfigError::ManifestValidationError {
                        reason: format!("Resource '{name}' needs `template` or `template_file`"),
                    }
                    .into());
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Resolve the names to operate on: all resources when `names` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`CloudConfigError::ResourceNotFound`] for the first unknown name.
    pub fn select<'a>(&'a self, names: &'a [String]) -> Result<Vec<&'a str>> {
        if names.is_empty() {
            return Ok(self.resources.keys().map(String::as_str).collect());
        }

        names
            .iter()
            .map(|name| -> Result<&'a str> {
                if self.resources.contains_key(name) {
                    Ok(name.as_str())
                } else {
                    Err(CloudConfigError::ResourceNotFound {
                        name: name.clone(),
                    }
                    .into())
                }
            })
            .collect()
    }

    /// Build the lifecycle configuration for a resource, reading its template file if needed.
    ///
    /// # Errors
    ///
    /// Fails for unknown names and unreadable template files.
    pub fn resource_config(&self, name: &str) -> Result<ResourceConfig> {
        let spec = self.resources.get(name).ok_or_else(|| CloudConfigError::ResourceNotFound {
            name: name.to_string(),
        })?;

        let template = match (&spec.template, &spec.template_file) {
            (Some(text), _) => text.clone(),
            (None, Some(file)) => {
                let path = self.resolve_path(file);
                read_text_file(&path)
                    .with_context(|| format!("Failed to load template for resource '{name}'"))?
            }
            (None, None) => {
                return Err(CloudConfigError::ManifestValidationError {
                    reason: format!("Resource '{name}' needs `template` or `template_file`"),
                }
                .into());
            }
        };

        Ok(ResourceConfig {
            template,
            variables: spec.vars.clone(),
            compress: spec.compress,
            validate: spec.validate,
        })
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.manifest_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Whether `name` is non-empty and made of ASCII letters, digits, `-` and `_`.
#[must_use]
pub fn is_valid_resource_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Locate the project file: the explicit path when given, otherwise the closest
/// `cloudconfig.toml` in the working directory or its parents.
///
/// # Errors
///
/// Returns [`CloudConfigError::ManifestNotFound`] when nothing is found.
pub fn find_manifest(explicit_path: Option<PathBuf>) -> Result<PathBuf> {
    match explicit_path {
        Some(path) if path.is_file() => Ok(path),
        Some(_) => Err(CloudConfigError::ManifestNotFound.into()),
        None => {
            let current = std::env::current_dir().context("Cannot determine current working directory")?;
            find_upwards(&current, MANIFEST_FILE).ok_or_else(|| CloudConfigError::ManifestNotFound.into())
        }
    }
}
