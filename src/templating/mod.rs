//! Template rendering for cloud-config documents.
//!
//! A resource's `template` is evaluated against its `variables` to produce the raw document.
//! The module is split into:
//!
//! - [`renderer`] - the [`TemplateRenderer`] that parses and evaluates HCL templates
//! - [`functions`] - the deterministic standard function library exposed to templates
//! - [`variables`] - the dynamically typed variable mapping and its string-only check
//! - [`error`] - [`RenderError`], the error type shared by rendering and compression
//!
//! # Template Syntax
//!
//! ```text
//! #cloud-config
//! hostname: ${var.hostname}
//! coreos:
//!   update:
//!     reboot_strategy: ${lower(var.reboot_strategy)}
//! ```
//!
//! Variables are bound under `var`; function names live in their own namespace, so a
//! variable can never shadow a function.

pub mod error;
pub mod functions;
pub mod renderer;
pub mod variables;

pub use error::RenderError;
pub use renderer::TemplateRenderer;
pub use variables::{VariableValue, Variables, string_variables};
