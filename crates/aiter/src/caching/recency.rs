use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use aiter_env::CacheCapacity;
use aiter_instrumentation::{CacheKind, MetricEvent, record_metric};
use rustc_hash::FxBuildHasher;
use tracing::debug;

use super::metrics::{CacheCounters, CacheMetrics};

/// Outcome of [`LruCache::get_or_insert_with`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheLookup<V> {
    Hit(V),
    Inserted(V),
}

impl<V> CacheLookup<V> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn into_value(self) -> V {
        match self {
            Self::Hit(value) | Self::Inserted(value) => value,
        }
    }
}

struct LruState<K: Hash + Eq, V> {
    entries: lru::LruCache<K, V, FxBuildHasher>,
    counters: CacheCounters,
}

/// Mutex-guarded recency cache shared across threads.
///
/// A successful lookup refreshes the entry. Inserting into a full bounded cache
/// evicts exactly the least-recently-used entry first; an unbounded cache never
/// evicts.
pub struct LruCache<K: Hash + Eq, V> {
    name: &'static str,
    kind: CacheKind,
    capacity: CacheCapacity,
    state: Mutex<LruState<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    pub fn new(name: &'static str, kind: CacheKind, capacity: CacheCapacity) -> Self {
        let entries = match capacity.limit() {
            Some(limit) => lru::LruCache::with_hasher(limit, FxBuildHasher),
            None => lru::LruCache::unbounded_with_hasher(FxBuildHasher),
        };
        Self {
            name,
            kind,
            capacity,
            state: Mutex::new(LruState {
                entries,
                counters: CacheCounters::default(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, LruState<K, V>> {
        self.state.lock().expect("lru cache mutex poisoned")
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> CacheCapacity {
        self.capacity
    }

    /// Look up `key`, refreshing its recency on a hit.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let detail = format!("{key:?}");
        let mut state = self.state();
        match state.entries.get(key).cloned() {
            Some(value) => {
                state.counters.record_hit(self.name, detail);
                Some(value)
            }
            None => {
                state.counters.record_miss(self.name, detail);
                None
            }
        }
    }

    /// Return the cached value for `key`, computing and inserting it on a miss.
    ///
    /// `create` runs with the cache locked; keep it cheap.
    pub fn get_or_insert_with(&self, key: K, create: impl FnOnce() -> V) -> CacheLookup<V> {
        let detail = format!("{key:?}");
        let mut state = self.state();
        if let Some(value) = state.entries.get(&key).cloned() {
            state.counters.record_hit(self.name, detail);
            return CacheLookup::Hit(value);
        }
        state.counters.record_miss(self.name, detail);
        let value = create();
        let evicted = Self::push_locked(&mut state, key, value.clone());
        drop(state);
        self.report_eviction(evicted.as_ref());
        CacheLookup::Inserted(value)
    }

    /// Insert `value` unless `key` is already present; returns the value that
    /// ends up cached together with any entry evicted to make room.
    pub fn insert_if_absent(&self, key: K, value: V) -> (V, Option<(K, V)>) {
        let mut state = self.state();
        if let Some(existing) = state.entries.get(&key).cloned() {
            return (existing, None);
        }
        let evicted = Self::push_locked(&mut state, key, value.clone());
        drop(state);
        self.report_eviction(evicted.as_ref());
        (value, evicted)
    }

    /// Insert or replace `key`; returns the entry evicted to make room, if any.
    pub fn insert(&self, key: K, value: V) -> Option<(K, V)> {
        let evicted = Self::push_locked(&mut self.state(), key, value);
        self.report_eviction(evicted.as_ref());
        evicted
    }

    /// Push under the lock and count an eviction; reporting happens once the lock is released.
    fn push_locked(state: &mut LruState<K, V>, key: K, value: V) -> Option<(K, V)> {
        let displaced = state.entries.push(key, value)?;
        // `push` also hands back the previous value when the key was replaced.
        if state.entries.contains(&displaced.0) {
            return None;
        }
        state.counters.count_eviction();
        Some(displaced)
    }

    fn report_eviction(&self, evicted: Option<&(K, V)>) {
        let Some((key, _)) = evicted else {
            return;
        };
        let detail = format!("{key:?}");
        debug!(cache = self.name, key = %detail, "evicted least recently used entry");
        record_metric!(MetricEvent::CacheEviction {
            cache: self.kind,
            key: detail.clone(),
        });
        self.state().counters.note_eviction(self.name, detail);
    }

    /// Membership test that leaves recency untouched.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state().entries.contains(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state().entries.pop(key)
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys ordered from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<K> {
        self.state().entries.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn clear(&self) {
        let mut state = self.state();
        let evicted = state.entries.len() as u64;
        state.entries.clear();
        state.counters.record_clear(self.name, evicted);
    }

    pub fn metrics(&self) -> CacheMetrics {
        let state = self.state();
        CacheMetrics::from_parts(state.entries.len(), self.capacity, &state.counters)
    }
}

#[cfg(test)]
#[path = "recency.test.rs"]
mod tests;
