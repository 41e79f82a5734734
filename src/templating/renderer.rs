//! Template rendering engine backed by HCL templates.
//!
//! This module provides the [`TemplateRenderer`] that evaluates a template string against a
//! set of string variables. Templates use HCL template syntax:
//!
//! - `${ expr }` interpolates an expression
//! - `$${` produces a literal `${`
//! - `%{ if cond }...%{ endif }` and `%{ for x in list }...%{ endfor }` are directives
//!
//! Variables are bound under the `var` namespace (`${var.hostname}`) and the functions of the
//! [standard library](super::functions) are available in every evaluation.
//!
//! # Output type
//!
//! A template that consists of exactly one interpolation (`"${expr}"`) evaluates to the
//! expression's own value, which must be a string. A template whose root expression yields a
//! list, map, number or bool is rejected with [`RenderError::UnexpectedType`] rather than
//! coerced, since silent coercion hides authoring mistakes. Templates mixing literal text and
//! interpolations always produce a string.

use std::collections::BTreeMap;
use std::str::FromStr;

use hcl::Value;
use hcl::eval::{Context, Evaluate};
use hcl::template::{Element, Template};
use regex::Regex;
use strsim::levenshtein;

use super::error::RenderError;
use super::functions::{self, register_standard_library, value_type_name};
use super::variables::{Variables, string_bindings};

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Namespace variables are bound under.
pub const VARIABLE_NAMESPACE: &str = "var";

/// Template renderer with HCL evaluation and the standard function library.
///
/// The renderer holds no mutable state: every call to [`render`](Self::render) builds a fresh
/// evaluation context, so the output depends only on the template, the variables and the
/// fixed function set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Create a new renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Render `template` with `variables`.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidVariableType`] when a variable is not a string (checked
    ///   before anything is parsed)
    /// - [`RenderError::EmptyTemplate`] when the template is empty
    /// - [`RenderError::Parse`] when the template syntax is invalid
    /// - [`RenderError::Eval`] for undefined variables, type mismatches and function errors
    /// - [`RenderError::UnexpectedType`] when the root expression is not a string
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cloudconfig::templating::{TemplateRenderer, string_variables};
    ///
    /// let renderer = TemplateRenderer::new();
    /// let vars = string_variables([("name", "world")]);
    /// assert_eq!(renderer.render("hello ${var.name}", &vars)?, "hello world");
    /// # Ok::<(), cloudconfig::templating::RenderError>(())
    /// ```
    pub fn render(&self, template: &str, variables: &Variables) -> Result<String, RenderError> {
        let bindings = string_bindings(variables)?;

        if template.is_empty() {
            return Err(RenderError::EmptyTemplate);
        }

        let parsed = Template::from_str(template).map_err(|e| RenderError::Parse {
            message: e.to_string(),
        })?;

        let mut ctx = Context::new();
        register_standard_library(&mut ctx);
        ctx.declare_var(VARIABLE_NAMESPACE, functions::string_object(&bindings));

        tracing::debug!(
            "Rendering template ({} bytes, {} variable(s), {} element(s))",
            template.len(),
            bindings.len(),
            parsed.elements().len()
        );

        let rendered = match parsed.elements() {
            [Element::Interpolation(interpolation)] => {
                let value = interpolation
                    .expr
                    .evaluate(&ctx)
                    .map_err(|e| self.eval_error(e.to_string(), template, &bindings))?;
                match value {
                    Value::String(s) => s,
                    other => {
                        return Err(RenderError::UnexpectedType {
                            found: value_type_name(&other).to_string(),
                        });
                    }
                }
            }
            _ => parsed
                .evaluate(&ctx)
                .map_err(|e| self.eval_error(e.to_string(), template, &bindings))?,
        };

        tracing::debug!("Rendered template to {} bytes", rendered.len());
        Ok(rendered)
    }

    /// Build an evaluation error, attaching suggestions for undefined `var.*` references.
    fn eval_error(
        &self,
        message: String,
        template: &str,
        bindings: &BTreeMap<String, String>,
    ) -> RenderError {
        let mut suggestions = Vec::new();
        for name in undefined_references(template, bindings) {
            for candidate in find_similar(&name, bindings.keys()) {
                if !suggestions.contains(&candidate) {
                    suggestions.push(candidate);
                }
            }
        }

        if !suggestions.is_empty() {
            tracing::debug!("Suggesting similar variables: {:?}", suggestions);
        }

        RenderError::Eval {
            message,
            suggestions,
        }
    }
}

/// Names referenced as `var.<name>` in the template that have no binding.
fn undefined_references(template: &str, bindings: &BTreeMap<String, String>) -> Vec<String> {
    let Ok(re) = Regex::new(r"\bvar\.([A-Za-z_][A-Za-z0-9_-]*)") else {
        return Vec::new();
    };
    let mut names: Vec<String> = re
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !bindings.contains_key(name))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Declared variable names close enough to `target` to be a likely typo.
fn find_similar<'a>(target: &str, available: impl Iterator<Item = &'a String>) -> Vec<String> {
    let threshold = (target.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
    let mut scored: Vec<(usize, &String)> = available
        .map(|name| (levenshtein(target, name), name))
        .filter(|(distance, _)| *distance <= threshold)
        .collect();
    scored.sort();
    scored.into_iter().take(3).map(|(_, name)| name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templating::string_variables;
    use serde_json::json;

    fn render(template: &str, vars: &[(&str, &str)]) -> Result<String, RenderError> {
        TemplateRenderer::new().render(template, &string_variables(vars.iter().copied()))
    }

    #[test]
    fn test_render_plain_text() {
        assert_eq!(render("#cloud-config\nhostname: web\n", &[]).unwrap(), "#cloud-config\nhostname: web\n");
    }

    #[test]
    fn test_render_interpolates_variables() {
        assert_eq!(render("hello ${var.name}", &[("name", "world")]).unwrap(), "hello world");
        assert_eq!(
            render("${var.a}-${var.b}", &[("a", "x"), ("b", "y")]).unwrap(),
            "x-y"
        );
    }

    #[test]
    fn test_render_single_interpolation_string() {
        assert_eq!(render("${var.name}", &[("name", "world")]).unwrap(), "world");
        assert_eq!(render("${upper(var.name)}", &[("name", "world")]).unwrap(), "WORLD");
    }

    #[test]
    fn test_render_escape_sequence() {
        assert_eq!(render("$${var.name}", &[("name", "world")]).unwrap(), "${var.name}");
    }

    #[test]
    fn test_render_directives() {
        let template = "%{ for k in split(\",\", var.keys) }- ${k}\n%{ endfor }";
        assert_eq!(render(template, &[("keys", "a,b")]).unwrap(), "- a\n- b\n");

        let template = "%{ if var.env == \"prod\" }strict%{ else }relaxed%{ endif }";
        assert_eq!(render(template, &[("env", "prod")]).unwrap(), "strict");
        assert_eq!(render(template, &[("env", "dev")]).unwrap(), "relaxed");
    }

    #[test]
    fn test_render_rejects_non_string_root() {
        match render("${length(split(\",\", var.list))}", &[("list", "a,b")]) {
            Err(RenderError::UnexpectedType {
                found,
            }) => assert_eq!(found, "number"),
            other => panic!("expected UnexpectedType, got {:?}", other),
        }
        assert!(matches!(
            render("${split(\",\", \"a,b\")}", &[]),
            Err(RenderError::UnexpectedType { ref found }) if found == "list"
        ));
    }

    #[test]
    fn test_render_mixed_template_stringifies_numbers() {
        assert_eq!(render("count=${length(\"abc\")}", &[]).unwrap(), "count=3");
    }

    #[test]
    fn test_render_parse_error() {
        let err = render("hello ${var.name", &[("name", "world")]).unwrap_err();
        assert!(matches!(err, RenderError::Parse { .. }), "got {:?}", err);
    }

    #[test]
    fn test_render_undefined_variable_with_suggestion() {
        let err = render("hello ${var.nmae}", &[("name", "world")]).unwrap_err();
        match err {
            RenderError::Eval {
                suggestions,
                ..
            } => assert_eq!(suggestions, vec!["name".to_string()]),
            other => panic!("expected Eval, got {:?}", other),
        }
    }

    #[test]
    fn test_render_unknown_function() {
        let err = render("${nope(\"x\")}", &[]).unwrap_err();
        assert!(matches!(err, RenderError::Eval { .. }), "got {:?}", err);
    }

    #[test]
    fn test_render_rejects_non_string_variable_before_parsing() {
        let mut vars = string_variables([("name", "world")]);
        vars.insert("x".to_string(), json!(5));

        // Template is also malformed; the variable check must win.
        let err = TemplateRenderer::new().render("${", &vars).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidVariableType { ref key, ref found } if key == "x" && found == "number"
        ));
    }

    #[test]
    fn test_render_empty_template() {
        assert!(matches!(render("", &[]), Err(RenderError::EmptyTemplate)));
        assert_eq!(render(" ", &[]).unwrap(), " ");
    }

    #[test]
    fn test_variable_named_like_function_does_not_shadow() {
        assert_eq!(render("${upper(var.upper)}", &[("upper", "x")]).unwrap(), "X");
    }

    #[test]
    fn test_render_is_deterministic() {
        let vars = [("b", "2"), ("a", "1")];
        let template = "#cloud-config\nhostname: ${var.a}${var.b}\n";
        assert_eq!(render(template, &vars).unwrap(), render(template, &vars).unwrap());
    }

    #[test]
    fn test_find_similar() {
        let names = ["hostname".to_string(), "hostgroup".to_string(), "zone".to_string()];
        assert_eq!(find_similar("hostnme", names.iter()), vec!["hostname".to_string()]);
        assert!(find_similar("completely_different", names.iter()).is_empty());
    }
}
