use std::sync::mpsc;
use std::sync::{Arc, Mutex as StdMutex};
use std::thread;
use std::time::Duration;

use aiter_instrumentation::{EnrichedMetricEvent, MetricExporter, MetricsLayer};
use tracing_subscriber::layer::SubscriberExt;

use super::*;
use crate::caching::CacheEventKind;

fn bounded(limit: usize) -> LruCache<String, u32> {
    LruCache::new("test", CacheKind::KernelNames, CacheCapacity::bounded(limit))
}

#[test]
fn bounded_cache_evicts_least_recently_used() {
    let cache = bounded(2);
    cache.insert("a".into(), 1);
    cache.insert("b".into(), 2);
    let evicted = cache.insert("c".into(), 3);

    assert_eq!(evicted, Some(("a".to_string(), 1)));
    assert!(!cache.contains("a"));
    assert!(cache.contains("b"));
    assert!(cache.contains("c"));
    assert_eq!(cache.metrics().evictions, 1);
}

#[test]
fn lookup_refreshes_recency() {
    let cache = bounded(2);
    cache.insert("a".into(), 1);
    cache.insert("b".into(), 2);
    assert_eq!(cache.get("a"), Some(1));

    cache.insert("c".into(), 3);
    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert_eq!(cache.keys_by_recency(), vec!["c".to_string(), "a".to_string()]);
}

#[test]
fn replacing_a_key_is_not_an_eviction() {
    let cache = bounded(2);
    cache.insert("a".into(), 1);
    cache.insert("b".into(), 2);
    assert_eq!(cache.insert("a".into(), 10), None);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a"), Some(10));
    assert_eq!(cache.metrics().evictions, 0);
}

#[test]
fn unbounded_cache_never_evicts() {
    let cache: LruCache<String, u32> = LruCache::new("test", CacheKind::Artifacts, CacheCapacity::Unbounded);
    for idx in 0..1_000 {
        assert_eq!(cache.insert(format!("k{idx}"), idx), None);
    }
    assert_eq!(cache.len(), 1_000);
    assert_eq!(cache.metrics().evictions, 0);
}

#[test]
fn get_or_insert_reports_hits_and_misses() {
    let cache = bounded(4);
    let first = cache.get_or_insert_with("a".into(), || 7);
    let second = cache.get_or_insert_with("a".into(), || unreachable!("value is cached"));

    assert_eq!(first, CacheLookup::Inserted(7));
    assert!(second.is_hit());
    assert_eq!(second.into_value(), 7);

    let metrics = cache.metrics();
    assert_eq!((metrics.hits, metrics.misses), (1, 1));
    assert_eq!(metrics.last_event.map(|event| event.kind), Some(CacheEventKind::Hit));
}

#[test]
fn insert_if_absent_keeps_first_value() {
    let cache = bounded(4);
    assert_eq!(cache.insert_if_absent("a".into(), 1), (1, None));
    assert_eq!(cache.insert_if_absent("a".into(), 2), (1, None));
    assert_eq!(cache.get("a"), Some(1));
}

#[test]
fn clear_empties_and_counts() {
    let cache = bounded(4);
    cache.insert("a".into(), 1);
    cache.insert("b".into(), 2);
    cache.clear();

    let metrics = cache.metrics();
    assert!(cache.is_empty());
    assert_eq!(metrics.evictions, 2);
    assert_eq!(metrics.last_event.map(|event| event.kind), Some(CacheEventKind::Cleared));
}

#[test]
fn concurrent_inserts_respect_capacity() {
    let cache = Arc::new(bounded(8));
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for idx in 0..100 {
                    cache.insert(format!("w{worker}-{idx}"), idx);
                    assert!(cache.len() <= 8);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    assert_eq!(cache.len(), 8);
    assert_eq!(cache.metrics().evictions, 400 - 8);
}

/// Reads the cache from another thread while an eviction metric is exported.
struct ReentrantExporter {
    cache: Arc<LruCache<String, u32>>,
    observed: Arc<StdMutex<Vec<(String, Option<usize>)>>>,
}

impl MetricExporter for ReentrantExporter {
    fn export(&self, event: &EnrichedMetricEvent) {
        let MetricEvent::CacheEviction { key, .. } = &event.event else {
            return;
        };
        let (sender, receiver) = mpsc::channel();
        let cache = Arc::clone(&self.cache);
        thread::spawn(move || {
            let _ = sender.send(cache.len());
        });
        let len = receiver.recv_timeout(Duration::from_secs(2)).ok();
        self.observed.lock().unwrap().push((key.clone(), len));
    }
}

#[test]
fn eviction_metric_is_exported_after_the_lock_is_released() {
    let cache = Arc::new(bounded(1));
    let observed = Arc::new(StdMutex::new(Vec::new()));
    let exporter = ReentrantExporter {
        cache: Arc::clone(&cache),
        observed: Arc::clone(&observed),
    };
    let subscriber = tracing_subscriber::registry().with(MetricsLayer::new(vec![Box::new(exporter)]));

    tracing::subscriber::with_default(subscriber, || {
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.get_or_insert_with("c".into(), || 3);
    });

    let observed = observed.lock().unwrap();
    assert_eq!(
        *observed,
        vec![("\"a\"".to_string(), Some(1)), ("\"b\"".to_string(), Some(1))]
    );
    let metrics = cache.metrics();
    assert_eq!(metrics.evictions, 2);
    let last = metrics.last_event.expect("eviction should be the last event");
    assert_eq!((last.kind, last.detail.as_str()), (CacheEventKind::Evicted, "\"b\""));
}
