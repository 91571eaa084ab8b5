//! Variable resolution module
//!
//! Discovers dependencies of query templates, derives cache keys, keeps
//! option lists in sync and turns user gestures into selection changes.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use dashvar_application::ports::ManualClock;
//! use dashvar_application::variable_resolver::VariableEngine;
//! use dashvar_domain::{DashboardVariable, Gesture, ResolverSettings, SelectedValue};
//!
//! let variable = DashboardVariable::custom("env", "dev, prod").with_multi_select(true);
//! let mut engine =
//!     VariableEngine::new(variable, ResolverSettings::default(), Arc::new(ManualClock::default()))
//!         .unwrap();
//!
//! let mut events = Vec::new();
//! engine.on_gesture(Gesture::All, &mut events);
//! assert_eq!(
//!     engine.variable().selected_value,
//!     Some(SelectedValue::Multiple(vec!["dev".into(), "prod".into()]))
//! );
//! assert!(engine.variable().all_selected);
//! ```

pub mod cache_key;
pub mod debounce;
pub mod engine;
pub mod parser;
pub mod reconciler;
pub mod selection;
pub mod sorter;

pub use cache_key::{build_cache_key, dependency_fingerprint};
pub use debounce::{DebounceState, DebouncedInput};
pub use engine::VariableEngine;
pub use parser::{VariableReference, extract_dependencies, has_dependencies, parse_placeholders};
pub use reconciler::{ErrorUpdate, ReconcileKind, Reconciliation, reconcile};
pub use selection::{apply_transition, next_selection, rederive_all};
pub use sorter::{normalize_values, parse_custom_values, sort_values, values_equal};
