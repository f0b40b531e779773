use std::path::PathBuf;

use aiter::KernelContext;
use aiter_env::{EnvVarGuard, JitEnvVar};

#[test]
fn global_context_is_built_once() {
    let _root = EnvVarGuard::set(JitEnvVar::RootDir, "/var/cache/kernels");
    let first = KernelContext::global().unwrap();

    // Later environment changes are not observed.
    let _moved = EnvVarGuard::set(JitEnvVar::RootDir, "/elsewhere");
    let second = KernelContext::global().unwrap();

    assert!(std::ptr::eq(first, second));
    assert_eq!(second.build_root().path(), PathBuf::from("/var/cache/kernels/.aiter"));
}
