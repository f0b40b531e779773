use std::path::PathBuf;

use super::*;
use crate::caching::CacheCapacity;

fn context_in(dir: &std::path::Path, capacity: CacheCapacity) -> KernelContext {
    KernelContext::new(RuntimeConfig::default().with_root_dir(dir).with_max_cache_size(capacity)).unwrap()
}

#[test]
fn missing_artifact_leaves_caches_consistent() {
    let ctx: KernelContext = KernelContext::new(RuntimeConfig::default().with_home_dir("/home/u")).unwrap();
    let kernel = ctx.kernel_name("k", &["x"]);

    assert_eq!(ctx.build_root().path(), PathBuf::from("/home/u/.aiter"));
    assert!(ctx.not_built("k_abcd1234"));

    // SAFETY: the artifact does not exist, so nothing is invoked.
    let err = unsafe { ctx.run(&KernelId::from("k_abcd1234"), "k_abcd1234", &KernelArgs::new()) }.unwrap_err();
    match err {
        KernelError::ArtifactMissing { path } => {
            assert_eq!(path, PathBuf::from("/home/u/.aiter/build/k_abcd1234/lib.so"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let stats = ctx.stats();
    assert_eq!(stats.artifacts.size, 0);
    assert_eq!(stats.artifact_loads, 0);
    assert_eq!(stats.names.size, 1);
    assert!(kernel.as_str().starts_with("k_"));
}

#[test]
fn kernel_names_honour_cache_bound() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path(), CacheCapacity::bounded(2));
    ctx.kernel_name("m", &["a"]);
    ctx.kernel_name("m", &["b"]);
    ctx.kernel_name("m", &["c"]);

    let stats = ctx.stats();
    assert_eq!(stats.names.size, 2);
    assert_eq!(stats.names.evictions, 1);
    assert_eq!(stats.names.capacity, CacheCapacity::bounded(2));
}

#[test]
fn clear_resets_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path(), CacheCapacity::Unbounded);
    ctx.kernel_name("m", &["a"]);
    ctx.clear();
    assert_eq!(ctx.stats().names.size, 0);
}

#[test]
fn unresolvable_root_fails_construction() {
    let result: Result<KernelContext, _> = KernelContext::new(RuntimeConfig::default());
    assert!(matches!(result, Err(KernelError::Configuration(_))));
}
