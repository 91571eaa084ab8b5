//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the resolution engine and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod observer;
mod query_executor;

pub use clock::{Clock, ManualClock};
pub use observer::{ObserverEvent, VariableObserver};
pub use query_executor::{QueryError, QueryExecutor, QueryPayload, QueryRequest};
