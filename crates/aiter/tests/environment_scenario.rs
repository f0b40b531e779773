use std::path::PathBuf;

use aiter::{ARTIFACT_FILE_NAME, CacheCapacity, KernelArgs, KernelContext, KernelError, KernelId, RuntimeConfig};
use aiter_env::{EnvVarGuard, JitEnvVar};
use serial_test::serial;

#[test]
#[serial]
fn home_fallback_resolves_build_root_and_reports_missing_artifact() {
    let _root = EnvVarGuard::unset(JitEnvVar::RootDir);
    let _home = EnvVarGuard::set(JitEnvVar::Home, "/home/u");

    let ctx: KernelContext = KernelContext::from_env().unwrap();
    assert_eq!(ctx.build_root().path(), PathBuf::from("/home/u/.aiter"));
    assert_eq!(ctx.build_root().artifact_path("foo"), PathBuf::from("/home/u/.aiter/build/foo").join(ARTIFACT_FILE_NAME));
    assert!(ctx.not_built("foo"));

    // SAFETY: the artifact is missing, so nothing is invoked.
    let err = unsafe { ctx.run(&KernelId::from("k_abcd1234"), "foo", &KernelArgs::new()) }.unwrap_err();
    assert!(err.needs_build(), "{err}");
    assert!(err.to_string().contains("/home/u/.aiter/build/foo/lib.so"));
}

#[test]
#[serial]
fn root_override_takes_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let _root = EnvVarGuard::set(JitEnvVar::RootDir, dir.path().to_str().unwrap());
    let _home = EnvVarGuard::set(JitEnvVar::Home, "/home/u");

    let ctx: KernelContext = KernelContext::from_env().unwrap();
    assert_eq!(ctx.build_root().path(), dir.path().join(".aiter"));
}

#[test]
#[serial]
fn cache_size_from_environment_bounds_both_caches() {
    let _home = EnvVarGuard::set(JitEnvVar::Home, "/home/u");
    for (raw, expected) in [
        ("2", CacheCapacity::bounded(2)),
        ("0", CacheCapacity::Unbounded),
        ("-1", CacheCapacity::Unbounded),
        ("many", CacheCapacity::Unbounded),
    ] {
        let _size = EnvVarGuard::set(JitEnvVar::MaxCacheSize, raw);
        let ctx: KernelContext = KernelContext::from_env().unwrap();
        let stats = ctx.stats();
        assert_eq!(stats.names.capacity, expected, "AITER_MAX_CACHE_SIZE={raw}");
        assert_eq!(stats.artifacts.capacity, expected, "AITER_MAX_CACHE_SIZE={raw}");
    }
}

#[test]
fn explicit_config_needs_no_environment() {
    let config = RuntimeConfig::default().with_home_dir("/srv/kernels");
    let ctx: KernelContext = KernelContext::new(config).unwrap();
    let first = ctx.kernel_name("module_norm", &["BF16", "4096"]);
    let second = ctx.kernel_name("module_norm", &["bf16", "4096"]);

    assert_eq!(first, second);
    assert!(matches!(KernelContext::<aiter::ArtifactHandle>::new(RuntimeConfig::default()), Err(KernelError::Configuration(_))));
}
