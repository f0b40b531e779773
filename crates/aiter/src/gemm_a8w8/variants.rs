//! Fixed registry of compiled variants.

use super::types::{GemmVariant, Scheduler, ShapeKey};

// Heuristic variants, one per branch of the fallback decision tree.

/// `K < 512`.
pub const SMALL_K: GemmVariant = GemmVariant::new(256, 128, 128, 64, Scheduler::Intrawave, 3);
/// `M < 64`, `N < 2048`, `K < 2048`.
pub const SMALL_BATCH_NARROW_SHALLOW: GemmVariant = GemmVariant::new(64, 16, 16, 128, Scheduler::Interwave, 1);
/// `M < 64`, `K < 2048`.
pub const SMALL_BATCH_SHALLOW: GemmVariant = GemmVariant::new(128, 16, 64, 128, Scheduler::Interwave, 1);
/// `M < 64`, `N < 2048`.
pub const SMALL_BATCH_NARROW: GemmVariant = GemmVariant::new(64, 16, 16, 256, Scheduler::Interwave, 2);
/// `M < 64`, `N > 2048`, `K > 2048`.
pub const SMALL_BATCH_WIDE_DEEP: GemmVariant = GemmVariant::new(256, 16, 64, 256, Scheduler::Intrawave, 1);
/// `M < 64` with `N` or `K` exactly 2048.
pub const SMALL_BATCH: GemmVariant = GemmVariant::new(128, 32, 64, 128, Scheduler::Interwave, 2);
/// `M >= 64`, `K < 1024`.
pub const MEDIUM_SMALL_K: GemmVariant = GemmVariant::new(256, 128, 256, 64, Scheduler::Intrawave, 3);
/// `64 <= M < 1024`.
pub const MEDIUM_BATCH: GemmVariant = GemmVariant::new(256, 128, 128, 128, Scheduler::Intrawave, 3);
/// `M, N, K >= 1024`.
pub const LARGE_BATCH: GemmVariant = GemmVariant::new(256, 256, 128, 64, Scheduler::Intrawave, 4);
/// Everything else: `M >= 1024` with `N < 1024`.
pub const LARGE: GemmVariant = GemmVariant::new(256, 256, 224, 128, Scheduler::Intrawave, 3);

pub const HEURISTIC_VARIANTS: [GemmVariant; 10] = [
    SMALL_K,
    SMALL_BATCH_NARROW_SHALLOW,
    SMALL_BATCH_SHALLOW,
    SMALL_BATCH_NARROW,
    SMALL_BATCH_WIDE_DEEP,
    SMALL_BATCH,
    MEDIUM_SMALL_K,
    MEDIUM_BATCH,
    LARGE_BATCH,
    LARGE,
];

// Variants that only appear in the tuned table.
pub const TUNED_M16: GemmVariant = GemmVariant::new(64, 16, 16, 512, Scheduler::Intrawave, 1);
pub const TUNED_M32: GemmVariant = GemmVariant::new(128, 32, 64, 256, Scheduler::Interwave, 2);
pub const TUNED_M64: GemmVariant = GemmVariant::new(256, 64, 64, 256, Scheduler::Intrawave, 3);
pub const TUNED_M128: GemmVariant = GemmVariant::new(256, 128, 64, 128, Scheduler::Intrawave, 3);
pub const TUNED_M256: GemmVariant = GemmVariant::new(256, 128, 128, 256, Scheduler::Intrawave, 4);
pub const TUNED_M512: GemmVariant = GemmVariant::new(256, 256, 128, 128, Scheduler::Intrawave, 3);
pub const TUNED_M512_WIDE_N: GemmVariant = GemmVariant::new(256, 128, 256, 128, Scheduler::Intrawave, 3);
pub const TUNED_LARGE_M: GemmVariant = GemmVariant::new(256, 256, 256, 64, Scheduler::Intrawave, 3);

/// One tuned `(M, N, K)` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TunedEntry {
    pub shape: ShapeKey,
    pub variant: GemmVariant,
}

const fn tuned(m: usize, n: usize, k: usize, variant: GemmVariant) -> TunedEntry {
    TunedEntry {
        shape: ShapeKey::new(m, n, k),
        variant,
    }
}

/// Shapes benchmarked offline, keyed on the padded `M` buckets.
pub const TUNED: &[TunedEntry] = &[
    // N=1280 K=8192
    tuned(16, 1280, 8192, TUNED_M16),
    tuned(32, 1280, 8192, TUNED_M32),
    tuned(64, 1280, 8192, TUNED_M64),
    tuned(128, 1280, 8192, TUNED_M128),
    tuned(256, 1280, 8192, TUNED_M256),
    tuned(512, 1280, 8192, TUNED_M512),
    tuned(1024, 1280, 8192, TUNED_M512),
    tuned(2048, 1280, 8192, TUNED_M512),
    tuned(4096, 1280, 8192, TUNED_LARGE_M),
    tuned(8192, 1280, 8192, TUNED_LARGE_M),
    tuned(16384, 1280, 8192, TUNED_LARGE_M),
    tuned(20480, 1280, 8192, TUNED_LARGE_M),
    // N=8192 K=1024
    tuned(16, 8192, 1024, TUNED_M16),
    tuned(32, 8192, 1024, TUNED_M32),
    tuned(64, 8192, 1024, TUNED_M64),
    tuned(128, 8192, 1024, TUNED_M128),
    tuned(256, 8192, 1024, TUNED_M256),
    tuned(512, 8192, 1024, TUNED_M512_WIDE_N),
    tuned(1024, 8192, 1024, TUNED_M512_WIDE_N),
    tuned(2048, 8192, 1024, TUNED_M512_WIDE_N),
    tuned(4096, 8192, 1024, TUNED_LARGE_M),
    tuned(8192, 8192, 1024, TUNED_LARGE_M),
    tuned(16384, 8192, 1024, TUNED_LARGE_M),
    tuned(20480, 8192, 1024, TUNED_LARGE_M),
    // N=7168 K=8192
    tuned(16, 7168, 8192, TUNED_M16),
    tuned(32, 7168, 8192, TUNED_M32),
    tuned(64, 7168, 8192, TUNED_M64),
    tuned(128, 7168, 8192, TUNED_M128),
    tuned(256, 7168, 8192, TUNED_M256),
    tuned(512, 7168, 8192, TUNED_M512),
    tuned(1024, 7168, 8192, TUNED_M512),
    tuned(2048, 7168, 8192, TUNED_M512),
    tuned(4096, 7168, 8192, TUNED_LARGE_M),
    tuned(8192, 7168, 8192, TUNED_LARGE_M),
    tuned(16384, 7168, 8192, TUNED_LARGE_M),
    tuned(20480, 7168, 8192, TUNED_LARGE_M),
    // N=8192 K=3584
    tuned(16, 8192, 3584, TUNED_M16),
    tuned(32, 8192, 3584, TUNED_M32),
    tuned(64, 8192, 3584, TUNED_M64),
    tuned(128, 8192, 3584, TUNED_M128),
    tuned(256, 8192, 3584, TUNED_M256),
    tuned(512, 8192, 3584, TUNED_M512),
    tuned(1024, 8192, 3584, TUNED_M512),
    tuned(2048, 8192, 3584, TUNED_M512),
    tuned(4096, 8192, 3584, TUNED_LARGE_M),
    tuned(8192, 8192, 3584, TUNED_LARGE_M),
    tuned(16384, 8192, 3584, TUNED_LARGE_M),
    tuned(20480, 8192, 3584, TUNED_LARGE_M),
];
