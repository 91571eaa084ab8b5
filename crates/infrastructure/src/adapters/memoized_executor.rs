//! Memoizing query executor
//!
//! Concurrent requests for the same cache key and query share one
//! execution. Successful payloads stay cached until they expire or are
//! pushed out by newer keys; failures are evicted so the next request for
//! that key runs the query again.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashvar_application::ports::{Clock, QueryError, QueryExecutor, QueryPayload, QueryRequest};
use dashvar_domain::CacheKey;
use tokio::sync::{Mutex, OnceCell};

use super::SystemClock;

/// How long a result is served from cache.
pub const DEFAULT_CACHE_TTL_MS: i64 = 60_000;
/// Maximum number of cached keys.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

type Slot = Arc<OnceCell<Result<QueryPayload, QueryError>>>;

/// The query text is part of the identity: an edited query with the same
/// dependencies must not be served the old query's result.
type SlotKey = (CacheKey, String);

struct Entry {
    created: DateTime<Utc>,
    slot: Slot,
}

/// Wraps an executor and memoizes its results by [`CacheKey`].
pub struct MemoizedQueryExecutor<E> {
    inner: E,
    slots: Mutex<HashMap<SlotKey, Entry>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl<E: QueryExecutor> MemoizedQueryExecutor<E> {
    /// Wraps `inner` with the default lifetime and capacity.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            slots: Mutex::new(HashMap::new()),
            ttl: Duration::milliseconds(DEFAULT_CACHE_TTL_MS),
            capacity: DEFAULT_CACHE_CAPACITY,
            clock: Arc::new(SystemClock::new()),
        }
    }

    /// Sets how long a result is served from cache.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the maximum number of cached keys. At least one is kept.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Uses `clock` to age entries.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the wrapped executor.
    pub const fn inner(&self) -> &E {
        &self.inner
    }

    /// Number of keys currently cached or in flight.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Returns `true` if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    /// Drops every cached result.
    pub async fn clear(&self) {
        self.slots.lock().await.clear();
    }

    async fn slot(&self, key: &SlotKey) -> Slot {
        let now = self.clock.now();
        let mut slots = self.slots.lock().await;
        slots.retain(|_, entry| now - entry.created < self.ttl);

        if let Some(entry) = slots.get(key) {
            return entry.slot.clone();
        }

        if slots.len() >= self.capacity
            && let Some(oldest) = slots
                .iter()
                .min_by_key(|(_, entry)| entry.created)
                .map(|(key, _)| key.clone())
        {
            tracing::debug!(key = %oldest.0, "cache full, evicting oldest entry");
            slots.remove(&oldest);
        }

        let slot = Slot::default();
        slots.insert(
            key.clone(),
            Entry {
                created: now,
                slot: slot.clone(),
            },
        );
        slot
    }

    async fn evict(&self, key: &SlotKey, slot: &Slot) {
        let mut slots = self.slots.lock().await;
        if slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(&current.slot, slot))
        {
            slots.remove(key);
        }
    }
}

#[async_trait]
impl<E: QueryExecutor> QueryExecutor for MemoizedQueryExecutor<E> {
    async fn execute(&self, request: &QueryRequest) -> Result<QueryPayload, QueryError> {
        let key = (request.key.clone(), request.query.clone());
        let slot = self.slot(&key).await;
        let outcome = slot
            .get_or_init(|| async {
                tracing::debug!(key = %request.key, "cache miss");
                self.inner.execute(request).await
            })
            .await
            .clone();

        if outcome.is_err() {
            self.evict(&key, &slot).await;
        }
        outcome
    }
}
