pub use aiter_env::CacheCapacity;
pub use metrics::{CacheCounters, CacheEvent, CacheEventKind, CacheMetrics, CacheStats};
pub use recency::{CacheLookup, LruCache};

mod metrics;
mod recency;
