//! Resolver settings

use serde::{Deserialize, Serialize};

/// Message shown when an option query fails.
pub const DEFAULT_INVALID_QUERY_MESSAGE: &str =
    "Please make sure query is valid and dependent variables are selected";

/// Quiescence window for free-text input, in milliseconds.
pub const DEFAULT_DEBOUNCE_WINDOW_MS: u64 = 500;

/// Tunables of the variable resolution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// How long free-text input must be stable before it is committed.
    pub debounce_window_ms: u64,

    /// User-facing message for failed option queries.
    pub invalid_query_message: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            debounce_window_ms: DEFAULT_DEBOUNCE_WINDOW_MS,
            invalid_query_message: DEFAULT_INVALID_QUERY_MESSAGE.to_string(),
        }
    }
}
