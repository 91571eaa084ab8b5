//! Dashvar Application - Resolution engine, use cases and ports
//!
//! This crate defines the application layer with:
//! - The variable resolution engine
//! - Port traits (interfaces for external dependencies)
//! - Use case orchestration
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod use_cases;
pub mod variable_resolver;

pub use error::{ApplicationError, ApplicationResult};
pub use ports::{
    Clock, ManualClock, ObserverEvent, QueryError, QueryExecutor, QueryPayload, QueryRequest,
    VariableObserver,
};
pub use use_cases::{ResolveVariable, ResolveVariableInput, ResolveVariableOutput};
pub use variable_resolver::VariableEngine;
