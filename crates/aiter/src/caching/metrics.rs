use std::fmt;

use aiter_env::CacheCapacity;

/// Summary of the most recent cache interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEvent {
    pub kind: CacheEventKind,
    pub cache: &'static str,
    pub detail: String,
}

impl CacheEvent {
    #[inline]
    pub fn new(kind: CacheEventKind, cache: &'static str, detail: String) -> Self {
        Self { kind, cache, detail }
    }
}

impl fmt::Display for CacheEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} -> {}", self.cache, self.kind, self.detail)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheEventKind {
    Hit,
    MissCreate,
    Cleared,
    Evicted,
}

impl fmt::Display for CacheEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => f.write_str("hit"),
            Self::MissCreate => f.write_str("miss-create"),
            Self::Cleared => f.write_str("cleared"),
            Self::Evicted => f.write_str("evicted"),
        }
    }
}

/// Internal counters used to build cache statistics.
#[derive(Clone, Debug, Default)]
pub struct CacheCounters {
    pub(crate) hits: u64,
    pub(crate) misses: u64,
    pub(crate) evictions: u64,
    pub(crate) last_event: Option<CacheEvent>,
}

impl CacheCounters {
    #[inline]
    pub fn record_hit(&mut self, cache: &'static str, detail: String) {
        self.hits = self.hits.saturating_add(1);
        self.last_event = Some(CacheEvent::new(CacheEventKind::Hit, cache, detail));
    }

    #[inline]
    pub fn record_miss(&mut self, cache: &'static str, detail: String) {
        self.misses = self.misses.saturating_add(1);
        self.last_event = Some(CacheEvent::new(CacheEventKind::MissCreate, cache, detail));
    }

    #[inline]
    pub fn record_clear(&mut self, cache: &'static str, evicted: u64) {
        self.evictions = self.evictions.saturating_add(evicted);
        self.last_event = Some(CacheEvent::new(CacheEventKind::Cleared, cache, format!("{evicted} entries")));
    }

    #[inline]
    pub fn count_eviction(&mut self) {
        self.evictions = self.evictions.saturating_add(1);
    }

    /// Set the eviction as the last event once its detail has been formatted.
    #[inline]
    pub fn note_eviction(&mut self, cache: &'static str, detail: String) {
        self.last_event = Some(CacheEvent::new(CacheEventKind::Evicted, cache, detail));
    }
}

/// Statistics about an individual cache.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub size: usize,
    pub capacity: CacheCapacity,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub last_event: Option<CacheEvent>,
}

impl CacheMetrics {
    #[inline]
    pub fn from_parts(size: usize, capacity: CacheCapacity, counters: &CacheCounters) -> Self {
        Self {
            size,
            capacity,
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            last_event: counters.last_event.clone(),
        }
    }
}

impl fmt::Display for CacheMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} entries, {} hits, {} misses, {} evictions",
            self.size, self.capacity, self.hits, self.misses, self.evictions
        )
    }
}

/// Snapshot of both process caches held by a [`KernelContext`](crate::KernelContext).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub names: CacheMetrics,
    pub artifacts: CacheMetrics,
    /// Libraries opened from disk, including duplicates discarded after a race.
    pub artifact_loads: u64,
}
