//! LRU of loaded kernel libraries keyed by kernel identifier.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use aiter_instrumentation::{CacheKind, MetricEvent, record_metric};
use tracing::{debug, info, info_span, warn};

use crate::artifact::{Artifact, ArtifactHandle};
use crate::caching::{CacheCapacity, CacheMetrics, LruCache};
use crate::error::KernelError;
use crate::signature::KernelId;

/// Shared, bounded cache of opened artifacts.
///
/// Handles are reference counted: eviction drops the cache's reference and the
/// library is unloaded once every caller holding a handle has released it.
pub struct ArtifactCache<A: Artifact = ArtifactHandle> {
    entries: LruCache<KernelId, Arc<A>>,
    loads: AtomicU64,
}

impl<A: Artifact> ArtifactCache<A> {
    pub fn new(capacity: CacheCapacity) -> Self {
        Self {
            entries: LruCache::new("kernel_artifacts", CacheKind::Artifacts, capacity),
            loads: AtomicU64::new(0),
        }
    }

    /// Return the cached artifact for `kernel`, loading it from `path()` on a miss.
    ///
    /// Loading happens outside the cache lock. When two threads miss on the same
    /// kernel both may load it; the first insert wins and the other thread's
    /// handle is dropped, so every caller receives the same artifact.
    pub fn get_or_load(&self, kernel: &KernelId, path: impl FnOnce() -> PathBuf) -> Result<Arc<A>, KernelError> {
        if let Some(artifact) = self.entries.get(kernel) {
            record_metric!(MetricEvent::ArtifactCacheAccess {
                kernel: kernel.to_string(),
                hit: true,
            });
            return Ok(artifact);
        }
        record_metric!(MetricEvent::ArtifactCacheAccess {
            kernel: kernel.to_string(),
            hit: false,
        });

        let path = path();
        let span = info_span!("artifact_get_or_load", kernel = %kernel, path = %path.display());
        let _enter = span.enter();

        let started = Instant::now();
        let loaded = Arc::new(A::load(&path)?);
        let elapsed = started.elapsed();
        self.loads.fetch_add(1, Ordering::Relaxed);
        info!(elapsed_us = elapsed.as_micros() as u64, "loaded kernel artifact");
        record_metric!(MetricEvent::ArtifactLoaded {
            kernel: kernel.to_string(),
            path: path.display().to_string(),
            duration_us: elapsed.as_micros() as u64,
        });

        let (cached, evicted) = self.entries.insert_if_absent(kernel.clone(), Arc::clone(&loaded));
        if !Arc::ptr_eq(&cached, &loaded) {
            debug!("another thread cached this kernel first; dropping duplicate load");
        }
        if let Some((evicted_kernel, artifact)) = evicted
            && Arc::strong_count(&artifact) > 1
        {
            warn!(kernel = %evicted_kernel, "evicted artifact still in use; unload deferred");
        }
        Ok(cached)
    }

    pub fn get(&self, kernel: &KernelId) -> Option<Arc<A>> {
        self.entries.get(kernel)
    }

    pub fn contains(&self, kernel: &KernelId) -> bool {
        self.entries.contains(kernel)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of times an artifact was opened from disk.
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.entries.metrics()
    }
}

#[cfg(test)]
#[path = "artifact_cache.test.rs"]
mod tests;
