use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::gemm_a8w8::variants::{HEURISTIC_VARIANTS, TUNED_LARGE_M, TUNED_M16, TUNED_M512, TUNED_M64};

fn select(m: usize, n: usize, k: usize) -> Selection {
    GemmA8W8Dispatcher::new().select(ShapeKey::new(m, n, k))
}

#[test]
fn tuned_shape_is_exact_even_when_heuristic_differs() {
    let shape = ShapeKey::new(64, 8192, 1024);
    let selection = GemmA8W8Dispatcher::new().select(shape);

    assert_eq!(selection.variant, TUNED_M64);
    assert_eq!(selection.source, VariantSource::Exact);
    assert_eq!(selection.key, shape);
    assert_ne!(heuristic(shape), TUNED_M64);
}

#[test]
fn small_m_pads_to_sixteen() {
    let selection = select(5, 1280, 8192);
    assert_eq!(selection.variant, TUNED_M16);
    assert_eq!(selection.source, VariantSource::Padded);
    assert_eq!(selection.key, ShapeKey::new(16, 1280, 8192));
}

#[test]
fn mid_m_pads_to_next_power_of_two() {
    let selection = select(300, 7168, 8192);
    assert_eq!(selection.variant, TUNED_M512);
    assert_eq!(selection.key.m, 512);
}

#[test]
fn large_m_pads_to_last_bucket() {
    let selection = select(18000, 8192, 3584);
    assert_eq!(selection.variant, TUNED_LARGE_M);
    assert_eq!(selection.key.m, 20480);
}

#[test]
fn pad_m_buckets() {
    assert_eq!(pad_m(1), 1);
    assert_eq!(pad_m(2), 16);
    assert_eq!(pad_m(16), 16);
    assert_eq!(pad_m(17), 32);
    assert_eq!(pad_m(300), 512);
    assert_eq!(pad_m(16384), 16384);
    assert_eq!(pad_m(16385), 20480);
    assert_eq!(pad_m(20480), 20480);
    assert_eq!(pad_m(20481), 20481);
}

#[test]
fn padding_never_decreases() {
    for m in 1..=40_000 {
        assert!(pad_m(m) >= m, "pad_m({m}) = {}", pad_m(m));
    }
}

#[test]
fn unknown_shapes_fall_back_to_heuristic() {
    let selection = select(5, 100, 100);
    assert_eq!(selection.variant, SMALL_K);
    assert_eq!(selection.source, VariantSource::Heuristic);
    assert_eq!(selection.key, ShapeKey::new(5, 100, 100));
}

#[test]
fn heuristic_branches() {
    let cases = [
        ((4096, 4096, 256), SMALL_K),
        ((8, 1024, 1024), SMALL_BATCH_NARROW_SHALLOW),
        ((8, 4096, 1024), SMALL_BATCH_SHALLOW),
        ((8, 1024, 4096), SMALL_BATCH_NARROW),
        ((8, 4096, 4096), SMALL_BATCH_WIDE_DEEP),
        ((8, 2048, 4096), SMALL_BATCH),
        ((8, 4096, 2048), SMALL_BATCH),
        ((128, 4096, 768), MEDIUM_SMALL_K),
        ((512, 4096, 4096), MEDIUM_BATCH),
        ((2048, 4096, 4096), LARGE_BATCH),
        ((2048, 512, 4096), LARGE),
    ];
    for ((m, n, k), expected) in cases {
        assert_eq!(heuristic(ShapeKey::new(m, n, k)), expected, "M={m} N={n} K={k}");
    }
}

#[test]
fn every_positive_shape_resolves_to_a_known_variant() {
    let dispatcher = GemmA8W8Dispatcher::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..10_000 {
        let shape = ShapeKey::new(rng.random_range(1..=40_000), rng.random_range(1..=40_000), rng.random_range(1..=40_000));
        let selection = dispatcher.select(shape);
        if selection.source == VariantSource::Heuristic {
            assert!(HEURISTIC_VARIANTS.contains(&selection.variant), "{shape}");
        } else {
            assert_eq!(dispatcher.lookup(selection.key), Some(selection.variant));
        }
    }
}

#[test]
fn heuristic_variants_have_distinct_entry_points() {
    let mut names: Vec<String> = HEURISTIC_VARIANTS.iter().map(GemmVariant::entry_point).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), HEURISTIC_VARIANTS.len());
    assert_eq!(SMALL_K.entry_point(), "a8w8_rowwise_256x128x128x64_intrawave_v3");
}

#[test]
fn custom_tables_are_honoured() {
    let shape = ShapeKey::new(7, 7, 7);
    let dispatcher = GemmA8W8Dispatcher::from_entries([(shape, LARGE)]);
    assert_eq!(dispatcher.len(), 1);
    assert_eq!(dispatcher.select(shape).variant, LARGE);
    assert_eq!(dispatcher.select(ShapeKey::new(8, 7, 7)).variant, SMALL_K);
}

#[test]
fn global_dispatcher_is_shared() {
    let first = GemmA8W8Dispatcher::global();
    let second = GemmA8W8Dispatcher::global();
    assert!(std::ptr::eq(first, second));
    assert!(!first.is_empty());
}
