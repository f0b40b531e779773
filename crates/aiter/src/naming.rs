//! Memoised kernel identifiers.

use aiter_instrumentation::{CacheKind, MetricEvent, record_metric};
use tracing::trace;

use crate::caching::{CacheCapacity, CacheMetrics, LruCache};
use crate::signature::{ArgumentSignature, KernelId, canonicalize};

/// LRU of canonical signature string to [`KernelId`].
///
/// Keyed by the canonical argument string alone, so two modules called with the
/// same arguments share an entry and the second module receives the first
/// module's identifier. Callers that reuse argument lists across modules must
/// fold the module into the arguments (see [`IdentifierCache::get_or_create_scoped`]).
pub struct IdentifierCache {
    entries: LruCache<String, KernelId>,
}

impl IdentifierCache {
    pub fn new(capacity: CacheCapacity) -> Self {
        Self {
            entries: LruCache::new("kernel_names", CacheKind::KernelNames, capacity),
        }
    }

    pub fn get_or_create<S: AsRef<str>>(&self, module_name: &str, args: &[S]) -> KernelId {
        let canonical = canonicalize(args);
        let lookup = self
            .entries
            .get_or_insert_with(canonical.clone(), || KernelId::derive(module_name, &canonical));
        let hit = lookup.is_hit();
        let kernel = lookup.into_value();

        trace!(module = module_name, %kernel, hit, "resolved kernel name");
        record_metric!(MetricEvent::KernelNameResolved {
            module: module_name.to_string(),
            kernel: kernel.to_string(),
            hit,
        });
        kernel
    }

    pub fn get_or_create_signature(&self, module_name: &str, signature: &ArgumentSignature) -> KernelId {
        self.get_or_create(module_name, signature.tokens())
    }

    /// Like [`get_or_create`](Self::get_or_create) with the module name prepended
    /// to the arguments, giving each module its own cache entries.
    pub fn get_or_create_scoped<S: AsRef<str>>(&self, module_name: &str, args: &[S]) -> KernelId {
        let scoped: Vec<&str> = std::iter::once(module_name).chain(args.iter().map(AsRef::as_ref)).collect();
        self.get_or_create(module_name, &scoped)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.entries.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::digest;

    #[test]
    fn identical_arguments_hit() {
        let cache = IdentifierCache::new(CacheCapacity::Unbounded);
        let first = cache.get_or_create("module_rope", &["bf16", "128"]);
        let second = cache.get_or_create("module_rope", &["bf16", "128"]);

        assert_eq!(first, second);
        assert_eq!(first.as_str(), format!("module_rope_{}", digest("bf16_128")));
        let metrics = cache.metrics();
        assert_eq!((metrics.hits, metrics.misses, metrics.size), (1, 1, 1));
    }

    #[test]
    fn case_variants_share_an_entry() {
        let cache = IdentifierCache::new(CacheCapacity::Unbounded);
        let upper = cache.get_or_create("m", &["A", "B"]);
        let lower = cache.get_or_create("m", &["a", "b"]);
        assert_eq!(upper, lower);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_is_keyed_by_arguments_only() {
        let cache = IdentifierCache::new(CacheCapacity::Unbounded);
        let first = cache.get_or_create("module_a", &["x"]);
        let second = cache.get_or_create("module_b", &["x"]);
        assert_eq!(first, second);
        assert!(second.as_str().starts_with("module_a_"));
    }

    #[test]
    fn scoped_lookup_separates_modules() {
        let cache = IdentifierCache::new(CacheCapacity::Unbounded);
        let first = cache.get_or_create_scoped("module_a", &["x"]);
        let second = cache.get_or_create_scoped("module_b", &["x"]);
        assert_ne!(first, second);
        assert!(second.as_str().starts_with("module_b_"));
    }

    #[test]
    fn bounded_cache_rederives_identical_identifier_after_eviction() {
        let cache = IdentifierCache::new(CacheCapacity::bounded(1));
        let first = cache.get_or_create("m", &["a"]);
        cache.get_or_create("m", &["b"]);
        let again = cache.get_or_create("m", &["a"]);

        assert_eq!(first, again);
        let metrics = cache.metrics();
        assert_eq!(metrics.evictions, 2);
        assert_eq!(metrics.hits, 0);
    }
}
