//! Rendering errors.
//!
//! Every failure between receiving a template and producing the final `rendered`
//! value surfaces as a [`RenderError`]. Each variant carries enough context
//! (parser diagnostic, offending variable, found type) to diagnose the problem
//! without re-running the pipeline.

use thiserror::Error;

/// Errors produced while rendering a template or compressing its output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template is empty.
    ///
    /// An empty rendering would never be recognised as an existing resource,
    /// so empty templates are refused up front.
    #[error("Template is empty")]
    EmptyTemplate,

    /// The template could not be parsed.
    #[error("Template parse error: {message}")]
    Parse {
        /// Parser diagnostic, including position when the parser reports one
        message: String,
    },

    /// The template parsed but failed during evaluation.
    #[error("Template evaluation error: {message}")]
    Eval {
        /// Evaluator diagnostic
        message: String,
        /// Declared variables close to an undefined reference, if any
        suggestions: Vec<String>,
    },

    /// The template's single root interpolation evaluated to a non-string value.
    #[error("Unexpected template output type: expected string, found {found}")]
    UnexpectedType {
        /// Name of the type actually produced
        found: String,
    },

    /// A variable value is not a string.
    #[error("Unexpected type for variable \"{key}\": expected string, found {found}")]
    InvalidVariableType {
        /// Variable name
        key: String,
        /// Name of the type actually supplied
        found: String,
    },

    /// Compressing or encoding the rendered output failed.
    #[error("Failed to gzip rendered output: {source}")]
    Compression {
        /// Underlying I/O error from the encoder
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// Format the error with "did you mean" hints when available.
    #[must_use]
    pub fn format_with_context(&self) -> String {
        match self {
            Self::Eval {
                suggestions,
                ..
            } if !suggestions.is_empty() => {
                let mut msg = self.to_string();
                msg.push_str("\n\nDid you mean one of these?\n");
                for suggestion in suggestions {
                    msg.push_str(&format!("  - var.{}\n", suggestion));
                }
                msg
            }
            _ => self.to_string(),
        }
    }
}
