//! Error handling for the cloudconfig CLI
//!
//! Library code returns typed errors ([`RenderError`], [`ValidationError`], [`ResourceError`]);
//! the project, state and command layers use [`CloudConfigError`]. Command code propagates
//! [`anyhow::Error`] with context, and `main` turns whatever comes back into an
//! [`ErrorContext`] through [`user_friendly_error`]:
//!
//! ```text
//! error: Failed to create resource 'web'
//! details: Template evaluation error: ...
//! suggestion: Check that every var.<name> reference has a matching entry in [resources.web.vars]
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use cloudconfig::core::{CloudConfigError, ErrorContext, user_friendly_error};
//!
//! let ctx = user_friendly_error(anyhow::Error::from(CloudConfigError::ManifestNotFound));
//! ctx.display();
//!
//! let ctx = ErrorContext::new(CloudConfigError::ResourceNotFound { name: "web".to_string() })
//!     .with_suggestion("Run 'cloudconfig plan' to list the configured resources");
//! println!("{ctx}");
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::resource::ResourceError;
use crate::templating::RenderError;
use crate::validation::ValidationError;

/// Errors from the project, state and command layers.
#[derive(Error, Debug)]
pub enum CloudConfigError {
    /// No project file was found
    ///
    /// The project file is searched in the working directory and then in every parent
    /// directory up to the filesystem root.
    #[error("Project file cloudconfig.toml not found in current directory or any parent directory")]
    ManifestNotFound,

    /// Project file parsing error
    #[error("Invalid project file syntax in {file}")]
    ManifestParseError {
        /// Path to the project file
        file: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Project file content is invalid
    #[error("Project file validation failed: {reason}")]
    ManifestValidationError {
        /// What is wrong
        reason: String,
    },

    /// A resource name given on the command line is not configured
    #[error("Resource '{name}' not found")]
    ResourceNotFound {
        /// Requested name
        name: String,
    },

    /// State file parsing error
    #[error("Invalid state file syntax in {file}")]
    StateParseError {
        /// Path to the state file
        file: String,
        /// Parser diagnostic
        reason: String,
    },

    /// File system error
    #[error("File system error: {operation}")]
    FileSystemError {
        /// The operation that failed
        operation: String,
        /// Path involved
        path: String,
    },

    /// Permission denied
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// The operation that was denied
        operation: String,
        /// Path involved
        path: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for CloudConfigError {
    fn clone(&self) -> Self {
        match self {
            Self::ManifestNotFound => Self::ManifestNotFound,
            Self::ManifestParseError {
                file,
                reason,
            } => Self::ManifestParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ManifestValidationError {
                reason,
            } => Self::ManifestValidationError {
                reason: reason.clone(),
            },
            Self::ResourceNotFound {
                name,
            } => Self::ResourceNotFound {
                name: name.clone(),
            },
            Self::StateParseError {
                file,
                reason,
            } => Self::StateParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::FileSystemError {
                operation,
                path,
            } => Self::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
            },
            Self::PermissionDenied {
                operation,
                path,
            } => Self::PermissionDenied {
                operation: operation.clone(),
                path: path.clone(),
            },
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::TomlSerError(e) => Self::Other {
                message: format!("TOML serialization error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error with a user-facing suggestion and details.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: CloudConfigError,
    /// How to fix it
    pub suggestion: Option<String>,
    /// Why it happened
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub const fn new(error: CloudConfigError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with actionable suggestions.
///
/// Recognises [`CloudConfigError`], resource pipeline errors ([`ResourceError`],
/// [`RenderError`], [`ValidationError`]), [`std::io::Error`] and [`toml::de::Error`] anywhere
/// in the chain; anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(err) = error.downcast_ref::<CloudConfigError>() {
        return create_error_context(err.clone());
    }

    if let Some(err) = error.downcast_ref::<ResourceError>() {
        return match err {
            ResourceError::Render(render) => render_error_context(&error, render),
            ResourceError::Validation(validation) => validation_error_context(&error, validation),
        };
    }

    if let Some(render) = error.downcast_ref::<RenderError>() {
        return render_error_context(&error, render);
    }

    if let Some(validation) = error.downcast_ref::<ValidationError>() {
        return validation_error_context(&error, validation);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(CloudConfigError::PermissionDenied {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check file ownership and permissions")
                .with_details("cloudconfig doesn't have permission to read or write a file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(CloudConfigError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details("A required file or directory cannot be found");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(CloudConfigError::ManifestParseError {
            file: "cloudconfig.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your cloudconfig.toml file. Verify quotes, brackets, and indentation")
        .with_details("TOML parsing errors are usually caused by missing quotes or mismatched brackets");
    }

    ErrorContext::new(CloudConfigError::Other {
        message: with_cause_chain(&error),
    })
}

fn with_cause_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn render_error_context(error: &anyhow::Error, render: &RenderError) -> ErrorContext {
    let suggestion = match render {
        RenderError::EmptyTemplate => "Give the resource a non-empty `template` or `template_file`",
        RenderError::Parse {
            ..
        } => "Check the template syntax: interpolations use ${...}, directives use %{...}, and a literal ${ is written $${",
        RenderError::Eval {
            ..
        } => "Check that every var.<name> reference has a matching entry in the resource's [vars] table and that function names are spelled correctly",
        RenderError::UnexpectedType {
            ..
        } => "Wrap the expression so it produces a string, e.g. ${format(\"%d\", ...)} or ${join(\",\", ...)}",
        RenderError::InvalidVariableType {
            ..
        } => "Quote the value in the [vars] table; only string variables are accepted",
        RenderError::Compression {
            ..
        } => "Retry with `gzip = false` to inspect the uncompressed output",
    };

    ErrorContext::new(CloudConfigError::Other {
        message: error.to_string(),
    })
    .with_details(render.format_with_context())
    .with_suggestion(suggestion)
}

fn validation_error_context(error: &anyhow::Error, validation: &ValidationError) -> ErrorContext {
    let details = match validation {
        ValidationError::Failed {
            entries,
        } => format!("The rendered document was rejected:\n  {}", entries.join("\n  ")),
        ValidationError::Invocation {
            message,
        } => message.clone(),
    };

    ErrorContext::new(CloudConfigError::Other {
        message: error.to_string(),
    })
    .with_details(details)
    .with_suggestion(
        "Fix the reported lines, run 'cloudconfig render <name>' to inspect the output, or set `validate = false` for documents that are not cloud-config",
    )
}

fn create_error_context(error: CloudConfigError) -> ErrorContext {
    match &error {
        CloudConfigError::ManifestNotFound => ErrorContext::new(error)
            .with_suggestion("Create a cloudconfig.toml file in your project directory or pass --manifest-path")
            .with_details("cloudconfig looks for cloudconfig.toml in the current directory and parent directories up to the filesystem root"),

        CloudConfigError::ManifestParseError {
            file,
            ..
        } => {
            let suggestion = format!(
                "Check the TOML syntax in {file}. Common issues: missing quotes, unmatched brackets, invalid characters"
            );
            let details = error_reason(&error);
            ErrorContext::new(error).with_suggestion(suggestion).with_details(details)
        }

        CloudConfigError::ManifestValidationError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Every [resources.<name>] table needs exactly one of `template` or `template_file`, and names may only use letters, digits, '-' and '_'"),

        CloudConfigError::ResourceNotFound {
            name,
        } => {
            let suggestion = format!("Add [resources.{name}] to cloudconfig.toml or check the spelling");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        CloudConfigError::StateParseError {
            file,
            ..
        } => {
            let suggestion =
                format!("Fix or remove {file}; a missing state file is treated as empty and rebuilt by 'cloudconfig apply'");
            let details = error_reason(&error);
            ErrorContext::new(error).with_suggestion(suggestion).with_details(details)
        }

        CloudConfigError::PermissionDenied {
            path,
            ..
        } => {
            let details = format!("Cannot access '{path}' due to insufficient permissions");
            ErrorContext::new(error)
                .with_suggestion("Check file ownership and permissions")
                .with_details(details)
        }

        _ => ErrorContext::new(error),
    }
}

fn error_reason(error: &CloudConfigError) -> String {
    match error {
        CloudConfigError::ManifestParseError {
            reason,
            ..
        }
        | CloudConfigError::StateParseError {
            reason,
            ..
        } => reason.clone(),
        other => other.to_string(),
    }
}
