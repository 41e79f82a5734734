//! Cloud-config resource lifecycle.
//!
//! A resource turns a [`ResourceConfig`] into a [`ResourceState`] by running the pipeline
//!
//! ```text
//! render -> [validate] -> [compress] -> identity
//! ```
//!
//! and exposes the five operations a declarative provisioning tool drives a resource with:
//!
//! | Operation | Effect on state |
//! |-----------|-----------------|
//! | [`create`](CloudConfigResource::create) | runs the pipeline and records `rendered` and `id` |
//! | [`read`](CloudConfigResource::read) | same as create |
//! | [`update`](CloudConfigResource::update) | same as create |
//! | [`delete`](CloudConfigResource::delete) | clears the state |
//! | [`exists`](CloudConfigResource::exists) | none; compares a fresh identity with the recorded one |
//!
//! The configuration is passed to every call and never retained. State is only assigned once
//! the whole pipeline has succeeded, so a failing run leaves the previous record untouched.
//!
//! # Examples
//!
//! ```rust
//! use cloudconfig::resource::{CloudConfigResource, ResourceConfig, ResourceState};
//! use cloudconfig::templating::string_variables;
//!
//! let resource = CloudConfigResource::new();
//! let mut config = ResourceConfig::new("hello ${var.name}")
//!     .with_variables(string_variables([("name", "world")]))
//!     .with_compress(false)
//!     .with_validate(false);
//! let mut state = ResourceState::default();
//!
//! resource.create(&config, &mut state)?;
//! assert_eq!(state.rendered, "hello world");
//! assert!(resource.exists(&config, &state)?);
//!
//! config.variables = string_variables([("name", "mars")]);
//! assert!(!resource.exists(&config, &state)?);
//! # Ok::<(), cloudconfig::resource::ResourceError>(())
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compression;
use crate::identity::{compute_identity, verify_identity};
use crate::templating::{RenderError, TemplateRenderer, Variables};
use crate::validation::{CloudConfigValidator, DocumentValidator, ValidationError, check_document};

/// Inputs of a cloud-config resource, supplied on every lifecycle call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Template source text
    pub template: String,

    /// Variable bindings; every value must be a string
    #[serde(default, alias = "vars")]
    pub variables: Variables,

    /// Gzip and base64-encode the rendered document
    #[serde(default = "default_true", alias = "gzip")]
    pub compress: bool,

    /// Validate the rendered document before recording it
    #[serde(default = "default_true")]
    pub validate: bool,
}

const fn default_true() -> bool {
    true
}

impl ResourceConfig {
    /// Configuration for `template` with no variables, compression and validation enabled.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            variables: Variables::new(),
            compress: true,
            validate: true,
        }
    }

    /// Replace the variable bindings.
    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Enable or disable validation.
    #[must_use]
    pub const fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// Computed outputs of a resource, persisted by the host between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    /// SHA-256 of `rendered`, lowercase hex
    #[serde(default)]
    pub id: String,

    /// Final document after rendering and optional compression
    #[serde(default)]
    pub rendered: String,
}

impl ResourceState {
    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.rendered.is_empty()
    }
}

/// Errors from a lifecycle operation.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Rendering or compression failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The rendered document was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Lifecycle controller for cloud-config resources.
#[derive(Debug, Clone, Default)]
pub struct CloudConfigResource<V = CloudConfigValidator> {
    renderer: TemplateRenderer,
    validator: V,
}

impl CloudConfigResource {
    /// Controller using the CoreOS cloud-config validator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            renderer: TemplateRenderer::new(),
            validator: CloudConfigValidator::new(),
        }
    }
}

impl<V: DocumentValidator> CloudConfigResource<V> {
    /// Controller using a custom validator.
    pub const fn with_validator(validator: V) -> Self {
        Self {
            renderer: TemplateRenderer::new(),
            validator,
        }
    }

    /// Run the pipeline without touching any state.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Render`] when rendering or compression fails and
    /// [`ResourceError::Validation`] when validation is enabled and rejects the document.
    pub fn render(&self, config: &ResourceConfig) -> Result<ResourceState, ResourceError> {
        self.pipeline(config, config.validate)
    }

    /// Provision the resource.
    ///
    /// # Errors
    ///
    /// Any pipeline failure; `state` is left unchanged.
    pub fn create(&self, config: &ResourceConfig, state: &mut ResourceState) -> Result<(), ResourceError> {
        self.commit("create", config, state)
    }

    /// Refresh the recorded state from the current configuration.
    ///
    /// # Errors
    ///
    /// Any pipeline failure; `state` is left unchanged.
    pub fn read(&self, config: &ResourceConfig, state: &mut ResourceState) -> Result<(), ResourceError> {
        self.commit("read", config, state)
    }

    /// Apply a changed configuration.
    ///
    /// # Errors
    ///
    /// Any pipeline failure; `state` is left unchanged.
    pub fn update(&self, config: &ResourceConfig, state: &mut ResourceState) -> Result<(), ResourceError> {
        self.commit("update", config, state)
    }

    /// Forget the resource.
    pub fn delete(&self, state: &mut ResourceState) {
        if !state.id.is_empty() {
            tracing::info!("Deleting cloud-config resource {}", state.id);
        }
        *state = ResourceState::default();
    }

    /// Whether the recorded state still matches the current configuration.
    ///
    /// An empty record is reported as missing without rendering anything. Validation is not
    /// run here; it only gates writes.
    ///
    /// # Errors
    ///
    /// Rendering or compression failures are surfaced rather than reported as missing.
    pub fn exists(&self, config: &ResourceConfig, state: &ResourceState) -> Result<bool, ResourceError> {
        if state.rendered.is_empty() || state.id.is_empty() {
            tracing::debug!("No recorded state; resource does not exist");
            return Ok(false);
        }

        let fresh = self.pipeline(config, false)?;
        let exists = verify_identity(&fresh.rendered, &state.id);
        if !exists {
            tracing::debug!("Recorded id {} differs from current id {}", state.id, fresh.id);
        }
        Ok(exists)
    }

    fn commit(
        &self,
        operation: &str,
        config: &ResourceConfig,
        state: &mut ResourceState,
    ) -> Result<(), ResourceError> {
        let computed = self.pipeline(config, config.validate)?;
        tracing::info!("Cloud-config resource {operation}: id {}", computed.id);
        *state = computed;
        Ok(())
    }

    fn pipeline(&self, config: &ResourceConfig, validate: bool) -> Result<ResourceState, ResourceError> {
        let document = self.renderer.render(&config.template, &config.variables)?;
        tracing::debug!("Rendered {} byte(s)", document.len());

        if validate {
            check_document(&self.validator, &document)?;
            tracing::debug!("Rendered document passed validation");
        }

        let rendered = if config.compress {
            compression::compress(&document)?
        } else {
            document
        };

        Ok(ResourceState {
            id: compute_identity(&rendered),
            rendered,
        })
    }
}
