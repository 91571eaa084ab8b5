//! Cache key derivation
//!
//! A query variable is re-fetched if and only if its key changes, so the key
//! must depend on nothing but the template and the current values of the
//! variables it references.

use dashvar_domain::{CacheKey, ExistingVariables, stringify_selection};

use super::parser::extract_dependencies;

/// Builds the dependency fingerprint of a template.
///
/// Each dependency contributes its name followed by its stringified
/// selection (empty when missing). All whitespace is stripped.
#[must_use]
pub fn dependency_fingerprint(template: &str, existing: &ExistingVariables) -> String {
    let mut fingerprint = String::new();
    for name in extract_dependencies(template) {
        fingerprint.push_str(&name);
        fingerprint.push_str(&stringify_selection(existing.selected_value(&name)));
    }
    fingerprint.retain(|c| !c.is_whitespace());
    fingerprint
}

/// Builds the cache key of a variable.
#[must_use]
pub fn build_cache_key(name: &str, template: &str, existing: &ExistingVariables) -> CacheKey {
    CacheKey::new(name, dependency_fingerprint(template, existing))
}
