use std::sync::OnceLock;

use aiter_instrumentation::{MetricEvent, VariantSource, record_metric};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::types::{GemmVariant, ShapeKey};
use super::variants::{
    LARGE, LARGE_BATCH, MEDIUM_BATCH, MEDIUM_SMALL_K, SMALL_BATCH, SMALL_BATCH_NARROW, SMALL_BATCH_NARROW_SHALLOW, SMALL_BATCH_SHALLOW,
    SMALL_BATCH_WIDE_DEEP, SMALL_K, TUNED,
};

/// Largest `M` padded to a power of two.
pub const MAX_POW2_PADDED_M: usize = 16384;
/// Bucket for `M` in `(16384, 20480]`.
pub const LARGEST_M_BUCKET: usize = 20480;

/// Result of [`GemmA8W8Dispatcher::select`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub variant: GemmVariant,
    pub source: VariantSource,
    /// Table key that matched; the requested shape for heuristic picks.
    pub key: ShapeKey,
}

/// Picks a compiled variant for a problem size.
///
/// The tuned table is immutable once built.
pub struct GemmA8W8Dispatcher {
    table: FxHashMap<ShapeKey, GemmVariant>,
}

impl Default for GemmA8W8Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl GemmA8W8Dispatcher {
    /// Dispatcher over the built-in tuned table.
    pub fn new() -> Self {
        Self::from_entries(TUNED.iter().map(|entry| (entry.shape, entry.variant)))
    }

    /// Dispatcher over an arbitrary table; later duplicates override earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = (ShapeKey, GemmVariant)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }

    /// Process-wide dispatcher, built on first use.
    pub fn global() -> &'static Self {
        static DISPATCHER: OnceLock<GemmA8W8Dispatcher> = OnceLock::new();
        DISPATCHER.get_or_init(|| {
            let dispatcher = Self::new();
            debug!(entries = dispatcher.len(), "built a8w8 gemm variant table");
            dispatcher
        })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn lookup(&self, shape: ShapeKey) -> Option<GemmVariant> {
        self.table.get(&shape).copied()
    }

    /// Exact lookup, then lookup with `M` padded, then the heuristic.
    pub fn select(&self, shape: ShapeKey) -> Selection {
        let selection = self.resolve(shape);
        debug!(
            %shape,
            variant = %selection.variant,
            source = %selection.source,
            "selected a8w8 gemm variant"
        );
        record_metric!(MetricEvent::GemmVariantSelected {
            m: shape.m,
            n: shape.n,
            k: shape.k,
            variant: selection.variant.entry_point(),
            source: selection.source,
        });
        selection
    }

    fn resolve(&self, shape: ShapeKey) -> Selection {
        if let Some(variant) = self.lookup(shape) {
            return Selection {
                variant,
                source: VariantSource::Exact,
                key: shape,
            };
        }

        let padded = shape.with_m(pad_m(shape.m));
        if padded != shape
            && let Some(variant) = self.lookup(padded)
        {
            return Selection {
                variant,
                source: VariantSource::Padded,
                key: padded,
            };
        }

        Selection {
            variant: heuristic(shape),
            source: VariantSource::Heuristic,
            key: shape,
        }
    }
}

/// Bucket `M` the way the tuned table is keyed. Never decreases `M`.
pub fn pad_m(m: usize) -> usize {
    if m > 1 && m <= 16 {
        16
    } else if m <= MAX_POW2_PADDED_M {
        m.next_power_of_two()
    } else if m <= LARGEST_M_BUCKET {
        LARGEST_M_BUCKET
    } else {
        m
    }
}

/// Fallback decision tree; the first matching branch wins.
pub fn heuristic(shape: ShapeKey) -> GemmVariant {
    let ShapeKey { m, n, k } = shape;

    if k < 512 {
        return SMALL_K;
    }
    if m < 64 {
        return if n < 2048 && k < 2048 {
            SMALL_BATCH_NARROW_SHALLOW
        } else if k < 2048 {
            SMALL_BATCH_SHALLOW
        } else if n < 2048 {
            SMALL_BATCH_NARROW
        } else if n > 2048 && k > 2048 {
            SMALL_BATCH_WIDE_DEEP
        } else {
            SMALL_BATCH
        };
    }
    if k < 1024 {
        MEDIUM_SMALL_K
    } else if m < 1024 {
        MEDIUM_BATCH
    } else if n >= 1024 {
        LARGE_BATCH
    } else {
        LARGE
    }
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod dispatcher_test;
