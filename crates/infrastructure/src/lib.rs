//! Dashvar Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: an HTTP query executor, a
//! memoizing wrapper around any executor, and the system clock.

pub mod adapters;
pub mod config;

pub use adapters::{MemoizedQueryExecutor, ReqwestQueryExecutor, SystemClock};
pub use config::{ConfigError, QueryClientConfig};
