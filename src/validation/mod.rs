//! Validation of rendered documents.
//!
//! Before a rendered document is compressed and recorded it can be checked against the target
//! format. Validators implement [`DocumentValidator`] and return a [`Report`] of entries; an empty
//! report means the document is valid. Two distinct failure modes exist:
//!
//! - the validator ran and found problems: [`ValidationError::Failed`] carrying every entry
//! - the validator could not inspect the document at all: [`ValidationError::Invocation`]
//!
//! # Validators
//!
//! - [`CloudConfigValidator`] - CoreOS cloud-config documents (the default)
//!
//! # Examples
//!
//! ```rust
//! use cloudconfig::validation::{CloudConfigValidator, ValidationError, check_document};
//!
//! let validator = CloudConfigValidator::new();
//! assert!(check_document(&validator, "#cloud-config\nhostname: web-1\n").is_ok());
//!
//! match check_document(&validator, "hello world") {
//!     Err(ValidationError::Failed { entries }) => assert_eq!(entries.len(), 1),
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```

pub mod cloud_config;
mod lines;
pub mod schema;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub use cloud_config::CloudConfigValidator;

/// Errors returned when a document does not pass validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The validator reported one or more entries.
    #[error("validation failed: {}", .entries.join("; "))]
    Failed {
        /// Formatted entries, e.g. `line 3: warning: unrecognized key "foo"`
        entries: Vec<String>,
    },

    /// The validator could not inspect the document.
    #[error("validator could not inspect document: {message}")]
    Invocation {
        /// Why inspection was impossible
        message: String,
    },
}

/// Checks a rendered document for structural correctness.
pub trait DocumentValidator {
    /// Inspect `document` and report every violation found.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Invocation`] when the document cannot be inspected at all.
    /// Violations are never returned as errors; they go into the [`Report`].
    fn validate(&self, document: &str) -> Result<Report, ValidationError>;
}

/// Run `validator` on `document`, turning a non-empty report into an error.
///
/// # Errors
///
/// Returns [`ValidationError::Failed`] with the formatted entries when the report is not empty,
/// or the validator's own [`ValidationError::Invocation`] error.
pub fn check_document<V>(validator: &V, document: &str) -> Result<(), ValidationError>
where
    V: DocumentValidator + ?Sized,
{
    let report = validator.validate(document)?;
    if report.is_empty() {
        return Ok(());
    }

    tracing::debug!("Validation produced {} entr(y/ies)", report.len());
    Err(ValidationError::Failed {
        entries: report.entries().iter().map(ToString::to_string).collect(),
    })
}

/// Severity of a report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// The document is wrong and would be rejected or misapplied
    Error,
    /// The document is accepted but likely not what the author meant
    Warning,
    /// Informational note
    Info,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        f.write_str(name)
    }
}

/// A single violation found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Severity
    pub kind: EntryKind,
    /// One-based line number the entry refers to
    pub line: usize,
    /// Human-readable description
    pub message: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.kind, self.message)
    }
}

/// Ordered collection of entries produced by a validator run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    entries: Vec<Entry>,
}

impl Report {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        self.push(EntryKind::Error, line, message);
    }

    /// Record a warning.
    pub fn warning(&mut self, line: usize, message: impl Into<String>) {
        self.push(EntryKind::Warning, line, message);
    }

    /// Record an informational note.
    pub fn info(&mut self, line: usize, message: impl Into<String>) {
        self.push(EntryKind::Info, line, message);
    }

    fn push(&mut self, kind: EntryKind, line: usize, message: impl Into<String>) {
        self.entries.push(Entry {
            kind,
            line,
            message: message.into(),
        });
    }

    /// All entries in the order they were found.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document passed without any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
