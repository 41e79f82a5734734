//! CoreOS cloud-config validator.
//!
//! User data handed to a CoreOS-style machine is one of:
//!
//! - empty: nothing to do
//! - an ignition config (a JSON object): not inspected here
//! - a script, when the first line starts with `#!`: not inspected here
//! - a cloud-config, when the first line is exactly `#cloud-config`: parsed as YAML and checked
//!
//! Anything else is rejected with a single error entry on line 1.
//!
//! # Rules
//!
//! Cloud-config documents go through these checks, in order:
//!
//! 1. **YAML syntax**: a positioned parse error becomes an error entry
//! 2. **Key names**: keys spelled with dashes are accepted as underscores, with a note
//! 3. **Structure**: unknown keys and values of the wrong kind are warnings
//! 4. **Values**: values outside their allowed pattern are errors
//! 5. **Deprecations**: deprecated keys are warnings
//! 6. **Placement**: `write_files` nested under `coreos` is a warning
//! 7. **File encodings**: `write_files` content must decode with its declared encoding
//! 8. **Discovery URLs**: etcd discovery endpoints must be http(s) URLs
//!
//! The original CoreOS tooling failed provisioning on any reported entry, and so does the
//! resource pipeline; severities only help the author prioritise.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde_yaml::{Mapping, Value as YamlValue};

use super::lines::{LineLocator, Segment};
use super::schema::{self, Field, Kind};
use super::{DocumentValidator, Report, ValidationError};
use crate::compression::gunzip;

/// First line that marks a cloud-config document.
pub const CLOUD_CONFIG_HEADER: &str = "#cloud-config";

/// Validator for CoreOS cloud-config user data.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudConfigValidator;

impl CloudConfigValidator {
    /// Create a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DocumentValidator for CloudConfigValidator {
    fn validate(&self, document: &str) -> Result<Report, ValidationError> {
        let mut report = Report::new();

        if document.is_empty() || is_ignition_config(document) || is_script(document) {
            tracing::debug!("Document is empty, ignition or a script; nothing to inspect");
            return Ok(report);
        }

        if !is_cloud_config(document) {
            report.error(1, "must be \"#cloud-config\" or begin with \"#!\"");
            return Ok(report);
        }

        let root = match serde_yaml::from_str::<YamlValue>(document) {
            Ok(root) => root,
            Err(e) => {
                return match e.location() {
                    Some(location) => {
                        report.error(location.line(), yaml_message(&e));
                        Ok(report)
                    }
                    None => Err(ValidationError::Invocation {
                        message: format!("couldn't parse YAML: {e}"),
                    }),
                };
            }
        };

        let mapping = match untag(&root) {
            YamlValue::Null => return Ok(report),
            YamlValue::Mapping(mapping) => mapping,
            other => {
                return Err(ValidationError::Invocation {
                    message: format!(
                        "cloud-config root must be a mapping, found {}",
                        yaml_type_name(other)
                    ),
                });
            }
        };

        let mut walker = Walker {
            locator: LineLocator::new(document),
            report: &mut report,
        };
        walker.check_mapping(mapping, schema::ROOT, &mut Vec::new());
        walker.check_write_files(mapping);
        walker.check_discovery_urls(mapping);

        tracing::debug!("Cloud-config validation finished with {} entr(y/ies)", report.len());
        Ok(report)
    }
}

/// Whether the first line is the cloud-config header (trailing whitespace ignored).
#[must_use]
pub fn is_cloud_config(document: &str) -> bool {
    first_line(document).trim_end() == CLOUD_CONFIG_HEADER
}

/// Whether the document is a script (`#!` on the first line).
#[must_use]
pub fn is_script(document: &str) -> bool {
    first_line(document).starts_with("#!")
}

/// Whether the document looks like an ignition config (a JSON object).
#[must_use]
pub fn is_ignition_config(document: &str) -> bool {
    let trimmed = document.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

fn first_line(document: &str) -> &str {
    document.split('\n').next().unwrap_or_default()
}

/// Parser message without the trailing position, which is reported as the entry line.
fn yaml_message(error: &serde_yaml::Error) -> String {
    let message = error.to_string();
    match message.find(" at line ") {
        Some(pos) => message[..pos].to_string(),
        None => message,
    }
}

fn untag(value: &YamlValue) -> &YamlValue {
    match value {
        YamlValue::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn yaml_type_name(value: &YamlValue) -> &'static str {
    match untag(value) {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "bool",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged value",
    }
}

/// Whether a YAML value can be decoded into the expected kind.
fn is_compatible(value: &YamlValue, kind: Kind) -> bool {
    match (untag(value), kind) {
        (YamlValue::String(_) | YamlValue::Number(_) | YamlValue::Bool(_), Kind::String) => true,
        (YamlValue::Bool(_), Kind::Bool) => true,
        (YamlValue::Number(n), Kind::Int) => n.is_i64() || n.is_u64(),
        (YamlValue::Number(_), Kind::Float) => true,
        (YamlValue::Sequence(_), Kind::List(_)) => true,
        (YamlValue::Mapping(_), Kind::Struct(_)) => true,
        _ => false,
    }
}

/// Scalar as the string the target system would see.
fn scalar_text(value: &YamlValue) -> Option<String> {
    match untag(value) {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn path_label(path: &[Segment<'_>]) -> String {
    let mut label = String::new();
    for segment in path {
        match segment {
            Segment::Key(key) => {
                if !label.is_empty() {
                    label.push('.');
                }
                label.push_str(key);
            }
            Segment::Index(index) => label.push_str(&format!("[{index}]")),
        }
    }
    label
}

/// Whether the last segment of `path` is a direct child of the top-level `coreos` key.
fn is_under_coreos(path: &[Segment<'_>]) -> bool {
    matches!(path, [Segment::Key(parent), Segment::Key(_)] if parent.replace('-', "_") == "coreos")
}

struct Walker<'doc, 'r> {
    locator: LineLocator<'doc>,
    report: &'r mut Report,
}

impl<'doc> Walker<'doc, '_> {
    fn check_mapping<'p>(
        &mut self,
        mapping: &'p Mapping,
        fields: &'static [Field],
        path: &mut Vec<Segment<'p>>,
    ) {
        for (key, value) in mapping {
            let Some(raw_key) = key.as_str() else {
                let line = self.locator.locate(path);
                let shown = scalar_text(key).unwrap_or_else(|| yaml_type_name(key).to_string());
                self.report.warning(line, format!("unrecognized key \"{shown}\""));
                continue;
            };

            path.push(Segment::Key(raw_key));
            let line = self.locator.locate(path);

            let normalized = raw_key.replace('-', "_");
            if normalized != raw_key {
                self.report
                    .info(line, format!("\"{raw_key}\" is deprecated, use \"{normalized}\" instead"));
            }

            if normalized == "write_files" && is_under_coreos(path) {
                self.report.warning(line, "write_files doesn't belong under coreos");
                path.pop();
                continue;
            }

            match Field::lookup(fields, &normalized) {
                None => self.report.warning(line, format!("unrecognized key \"{raw_key}\"")),
                Some(field) => {
                    if let Some(reason) = field.deprecated {
                        self.report.warning(line, format!("deprecated key \"{raw_key}\" ({reason})"));
                    }
                    self.check_value(value, field, raw_key, line, path);
                }
            }

            path.pop();
        }
    }

    fn check_value<'p>(
        &mut self,
        value: &'p YamlValue,
        field: &'static Field,
        name: &str,
        line: usize,
        path: &mut Vec<Segment<'p>>,
    ) {
        let value = untag(value);
        if value.is_null() {
            return;
        }

        if !is_compatible(value, field.kind) {
            self.report
                .warning(line, format!("incorrect type for \"{name}\" (want {})", field.kind));
            return;
        }

        match (value, field.kind) {
            (YamlValue::Mapping(mapping), Kind::Struct(fields)) => {
                self.check_mapping(mapping, fields, path);
            }
            (YamlValue::Sequence(items), Kind::List(inner)) => {
                for (index, item) in items.iter().enumerate() {
                    let item = untag(item);
                    if item.is_null() {
                        continue;
                    }
                    path.push(Segment::Index(index));
                    let item_line = self.locator.locate(path);
                    if !is_compatible(item, *inner) {
                        self.report.warning(
                            item_line,
                            format!("incorrect type for \"{name}[{index}]\" (want {inner})"),
                        );
                    } else if let (YamlValue::Mapping(mapping), Kind::Struct(fields)) = (item, *inner) {
                        self.check_mapping(mapping, fields, path);
                    }
                    path.pop();
                }
            }
            _ => self.check_validity(value, field, line),
        }
    }

    fn check_validity(&mut self, value: &YamlValue, field: &Field, line: usize) {
        let (Some(pattern), Some(text)) = (field.valid, scalar_text(value)) else {
            return;
        };
        match Regex::new(pattern) {
            Ok(re) if re.is_match(&text) => {}
            Ok(_) => self.report.error(line, format!("invalid value {text}")),
            Err(e) => tracing::warn!("Skipping value check for '{}': {}", field.name, e),
        }
    }

    /// `write_files` content must decode with its declared encoding.
    fn check_write_files(&mut self, root: &Mapping) {
        let Some(YamlValue::Sequence(files)) = root.get("write_files").map(untag) else {
            return;
        };

        for (index, file) in files.iter().enumerate() {
            let YamlValue::Mapping(file) = untag(file) else {
                continue;
            };
            let encoding = file.get("encoding").and_then(scalar_text);
            let content = file.get("content").and_then(scalar_text).unwrap_or_default();
            let Some(encoding) = encoding else {
                continue;
            };

            if decode_content(&content, &encoding) == Some(false) {
                let line = self.locator.locate(&[
                    Segment::Key("write_files"),
                    Segment::Index(index),
                    Segment::Key("content"),
                ]);
                self.report.error(line, format!("content cannot be decoded as \"{encoding}\""));
            }
        }
    }

    /// etcd discovery endpoints must be http(s) URLs.
    fn check_discovery_urls(&mut self, root: &Mapping) {
        let Some(YamlValue::Mapping(coreos)) = root.get("coreos").map(untag) else {
            return;
        };
        let Ok(url) = Regex::new(r"^https?://[^\s/?#]+(/\S*)?$") else {
            return;
        };

        for service in ["etcd", "etcd2"] {
            let Some(YamlValue::Mapping(config)) = coreos.get(service).map(untag) else {
                continue;
            };
            let Some(discovery) = config.get("discovery").and_then(scalar_text) else {
                continue;
            };
            if !url.is_match(&discovery) {
                let line = self.locator.locate(&[
                    Segment::Key("coreos"),
                    Segment::Key(service),
                    Segment::Key("discovery"),
                ]);
                self.report.warning(line, "discovery URL is not valid");
            }
        }
    }
}

/// Try decoding `content` with a cloud-config file encoding.
///
/// Returns `None` for encodings the validity rule already rejects.
fn decode_content(content: &str, encoding: &str) -> Option<bool> {
    let ok = match encoding {
        "base64" | "b64" => STANDARD.decode(content.trim()).is_ok(),
        "gz" | "gzip" => gunzip(content.as_bytes()).is_ok(),
        "gz+base64" | "gzip+base64" | "gz+b64" | "gzip+b64" => STANDARD
            .decode(content.trim())
            .ok()
            .is_some_and(|bytes| gunzip(&bytes).is_ok()),
        _ => return None,
    };
    Some(ok)
}
