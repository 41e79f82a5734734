//! Template variables.
//!
//! Variables arrive from the outside world (a TOML project file, a host tool) as
//! dynamically typed values. Only strings are accepted: any other type is rejected
//! before evaluation with [`RenderError::InvalidVariableType`] instead of being
//! silently stringified.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use super::RenderError;

/// A single dynamically typed variable value as supplied by the caller.
pub type VariableValue = JsonValue;

/// Variable mapping as supplied by the caller.
///
/// A `BTreeMap` keeps iteration order sorted, so binding and error reporting are
/// deterministic.
pub type Variables = BTreeMap<String, VariableValue>;

/// Build a [`Variables`] mapping from string pairs.
///
/// # Examples
///
/// ```rust
/// use cloudconfig::templating::string_variables;
///
/// let vars = string_variables([("name", "world")]);
/// assert_eq!(vars["name"], "world");
/// ```
pub fn string_variables<I, K, V>(pairs: I) -> Variables
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), JsonValue::String(v.into())))
        .collect()
}

/// Human-readable name of a dynamic value's type.
#[must_use]
pub fn type_name(value: &VariableValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "list",
        JsonValue::Object(_) => "map",
    }
}

/// Check that every variable is a string and return the string bindings.
///
/// Keys are checked in sorted order; the first non-string value aborts with
/// [`RenderError::InvalidVariableType`] naming that key and its type.
pub fn string_bindings(variables: &Variables) -> Result<BTreeMap<String, String>, RenderError> {
    variables
        .iter()
        .map(|(key, value)| match value {
            JsonValue::String(s) => Ok((key.clone(), s.clone())),
            other => Err(RenderError::InvalidVariableType {
                key: key.clone(),
                found: type_name(other).to_string(),
            }),
        })
        .collect()
}
