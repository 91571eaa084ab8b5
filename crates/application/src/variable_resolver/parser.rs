//! Placeholder parser for `{{.variable}}` syntax
//!
//! Finds the variables a query template depends on.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*?\.([^\s}]+)\s*?\}\}").expect("valid regex"));

/// Represents a parsed placeholder in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The referenced variable name (without `{{ . }}`).
    pub name: String,

    /// Byte range in the original template where this placeholder appears.
    pub span: Range<usize>,
}

/// Parses a template and returns every well-formed placeholder in order.
///
/// Malformed placeholders are not matched and are not reported.
///
/// # Examples
///
/// ```
/// use dashvar_application::variable_resolver::parser::parse_placeholders;
///
/// let refs = parse_placeholders("WHERE env = {{.env}} AND svc IN {{ .service }}");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "env");
/// assert_eq!(refs[1].name, "service");
/// ```
#[must_use]
pub fn parse_placeholders(template: &str) -> Vec<VariableReference> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(VariableReference {
                name: name.as_str().to_string(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Returns the names of the variables a template depends on, in order of
/// first appearance, each name once.
#[must_use]
pub fn extract_dependencies(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for reference in parse_placeholders(template) {
        if !names.contains(&reference.name) {
            names.push(reference.name);
        }
    }
    names
}

/// Returns true if the template references any variable.
#[must_use]
pub fn has_dependencies(template: &str) -> bool {
    PLACEHOLDER.is_match(template)
}
