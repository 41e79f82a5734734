//! cloudconfig - render, validate and track CoreOS cloud-config resources
//!
//! A cloud-config resource is a template plus string variables. Provisioning it runs a fixed
//! pipeline and records the result:
//!
//! ```text
//! template + variables
//!        |
//!   TemplateRenderer      HCL-style ${...} interpolation with a standard function library
//!        |
//!   [validate]            CoreOS cloud-config checks; any entry fails the run
//!        |
//!   [compress]            gzip, then standard base64
//!        |
//!   rendered -> identity  SHA-256, 64 lowercase hex characters
//! ```
//!
//! The identity is a pure function of `rendered`, which is a pure function of the template,
//! the variables and the compression flag. Comparing a fresh identity with a recorded one is
//! how drift is detected.
//!
//! # Modules
//!
//! ## Pipeline
//! - [`templating`] - template rendering and variable checks
//! - [`validation`] - document validators and the cloud-config rules
//! - [`compression`] - deterministic gzip+base64
//! - [`identity`] - SHA-256 identities
//! - [`resource`] - the lifecycle controller (create, read, update, delete, exists)
//!
//! ## Host
//! - [`manifest`] - `cloudconfig.toml` project files
//! - [`state`] - `cloudconfig.state.toml` bookkeeping
//! - [`cli`] - the `cloudconfig` command
//! - [`core`] - error types and user-facing error reporting
//! - [`utils`] - file system helpers
//!
//! # Example
//!
//! ```rust
//! use cloudconfig::resource::{CloudConfigResource, ResourceConfig, ResourceState};
//! use cloudconfig::templating::string_variables;
//!
//! let resource = CloudConfigResource::new();
//! let config = ResourceConfig::new("#cloud-config\nhostname: ${var.hostname}\n")
//!     .with_variables(string_variables([("hostname", "web-1")]));
//! let mut state = ResourceState::default();
//!
//! resource.create(&config, &mut state)?;
//! assert_eq!(state.id.len(), 64);
//! assert!(resource.exists(&config, &state)?);
//! # Ok::<(), cloudconfig::resource::ResourceError>(())
//! ```
//!
//! # Project File
//!
//! ```toml
//! [resources.web]
//! template_file = "templates/web.yaml"
//! gzip = true
//!
//! [resources.web.vars]
//! hostname = "web-1"
//! ```

pub mod cli;
pub mod compression;
pub mod core;
pub mod identity;
pub mod manifest;
pub mod resource;
pub mod state;
pub mod templating;
pub mod utils;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
