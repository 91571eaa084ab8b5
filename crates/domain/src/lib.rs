//! Dashvar Domain - Core dashboard variable types
//!
//! This crate defines the domain model of dashboard variables.
//! All types here are pure Rust with no I/O dependencies.

pub mod cache_key;
pub mod error;
pub mod selection;
pub mod settings;
pub mod value;
pub mod variable;
pub mod view;

pub use cache_key::{CACHE_KEY_NAMESPACE, CacheKey};
pub use error::{DomainError, DomainResult};
pub use selection::{ALL_DISPLAY, ALL_SENTINEL, Gesture, SelectionMode, SelectionTransition};
pub use settings::{DEFAULT_DEBOUNCE_WINDOW_MS, DEFAULT_INVALID_QUERY_MESSAGE, ResolverSettings};
pub use value::{SelectedValue, VariableValue, stringify_selection};
pub use variable::{DashboardVariable, ExistingVariables, SortOrder, VariableKind};
pub use view::{DisplayValue, VariableView};
