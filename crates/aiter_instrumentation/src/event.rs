//! Canonical metric event definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the two kernel caches an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    /// Canonical signature string to kernel identifier.
    KernelNames,
    /// Kernel identifier to loaded shared library.
    Artifacts,
}

/// How a GEMM variant was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantSource {
    /// `(M, N, K)` was present in the tuned table.
    Exact,
    /// The tuned table matched after padding `M`.
    Padded,
    /// Neither lookup matched; the decision tree picked the variant.
    Heuristic,
}

impl fmt::Display for VariantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Padded => f.write_str("padded"),
            Self::Heuristic => f.write_str("heuristic"),
        }
    }
}

/// Structured, type-safe metric events emitted by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MetricEvent {
    /// A kernel identifier was produced for a module call site.
    KernelNameResolved { module: String, kernel: String, hit: bool },
    /// A lookup against the artifact cache.
    ArtifactCacheAccess { kernel: String, hit: bool },
    /// A shared library was opened from the build root.
    ArtifactLoaded { kernel: String, path: String, duration_us: u64 },
    /// An entry was pushed out of one of the LRU caches.
    CacheEviction { cache: CacheKind, key: String },
    /// A GEMM variant was chosen for a problem size.
    GemmVariantSelected {
        m: usize,
        n: usize,
        k: usize,
        variant: String,
        source: VariantSource,
    },
}
