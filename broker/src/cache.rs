//! Per-adapter object cache: positions, account, unsettled instruments,
//! open orders, dividends, and miscellaneous typed values, each with an
//! independent TTL.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

/// Typed cache slot. `Misc` carries a qualifier string for ad hoc keys an
/// adapter needs beyond the fixed set (e.g. a single stock's `StockInfo`).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum CacheKey {
    Positions,
    Account,
    Unsettled,
    OpenOrders,
    Dividends,
    DividendsDetail,
    Misc(String),
}

const DEFAULT_TTL_SECS: u64 = 3600;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// `{(CacheKey) → CachedValue}` with a per-entry fetcher and freshness
/// check. One instance is scoped to a single adapter.
///
/// `V` is a single value type because every adapter request this models
/// (positions list, account struct, unsettled set, ...) is cached whole —
/// there is no partial-key lookup within a slot.
pub struct ObjectCache<V> {
    store: FxHashMap<CacheKey, Entry<V>>,
    ttl: Duration,
}

impl<V: Clone> ObjectCache<V> {
    pub fn new() -> Self {
        Self {
            store: FxHashMap::default(),
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn is_fresh(&self, key: &CacheKey, max_age: Duration) -> bool {
        self.store
            .get(key)
            .is_some_and(|e| e.inserted_at.elapsed() <= max_age)
    }

    /// Return the cached value if fresher than `max_age` (defaults to this
    /// cache's TTL when `None`), else call `fetch`, store, and return it.
    pub fn get<E>(
        &mut self,
        key: CacheKey,
        max_age: Option<Duration>,
        fetch: impl FnOnce() -> std::result::Result<V, E>,
    ) -> std::result::Result<V, E> {
        let max_age = max_age.unwrap_or(self.ttl);
        if self.is_fresh(&key, max_age) {
            return Ok(self.store[&key].value.clone());
        }
        let value = fetch()?;
        self.store.insert(
            key,
            Entry {
                value: value.clone(),
                inserted_at: Instant::now(),
            },
        );
        Ok(value)
    }

    /// Nullify every entry whose key is not in `keep`.
    pub fn clear_cache(&mut self, keep: &[CacheKey]) {
        self.store.retain(|k, _| keep.contains(k));
    }
}

impl<V: Clone> Default for ObjectCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
