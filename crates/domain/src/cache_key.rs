//! Composite cache key for option fetches

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed namespace tag of every variable cache key.
pub const CACHE_KEY_NAMESPACE: &str = "dashboard-variable";

/// Identifies one option fetch: a re-fetch happens if and only if the key
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    /// Fixed namespace tag.
    pub namespace: String,
    /// Name of the variable being resolved.
    pub name: String,
    /// Dependency names and their current values, whitespace stripped.
    pub fingerprint: String,
}

impl CacheKey {
    /// Creates a key in the variable namespace.
    #[must_use]
    pub fn new(name: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            namespace: CACHE_KEY_NAMESPACE.to_string(),
            name: name.into(),
            fingerprint: fingerprint.into(),
        }
    }

    /// Returns the key as its three ordered parts.
    #[must_use]
    pub fn parts(&self) -> [&str; 3] {
        [&self.namespace, &self.name, &self.fingerprint]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.name, self.fingerprint)
    }
}
