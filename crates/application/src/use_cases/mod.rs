//! Use cases
//!
//! Each use case orchestrates the resolution engine and ports for one
//! user-facing operation.

mod resolve_variable;

pub use resolve_variable::{ResolveVariable, ResolveVariableInput, ResolveVariableOutput};
