//! Adapters implementing application ports

mod memoized_executor;
mod reqwest_query_executor;
mod system_clock;

pub use memoized_executor::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_MS, MemoizedQueryExecutor};
pub use reqwest_query_executor::ReqwestQueryExecutor;
pub use system_clock::SystemClock;
