//! End-to-end tests against shared libraries built with the system C compiler.
//! Each test returns early when no compiler is available.

use std::path::Path;
use std::process::Command;

use aiter::gemm_a8w8::variants::TUNED_M16;
use aiter::gemm_a8w8::{GEMM_A8W8_MODULE, GemmA8W8, GemmA8W8Dispatcher, GemmA8W8Inputs, ShapeKey, VariantSource, gemm_a8w8_args};
use aiter::{Artifact, ArtifactHandle, CacheCapacity, Dtype, KernelArgs, KernelContext, KernelError, KernelId, RuntimeConfig, TensorDesc};

fn find_compiler() -> Option<&'static str> {
    ["cc", "gcc", "clang"]
        .into_iter()
        .find(|cc| Command::new(cc).arg("--version").output().is_ok_and(|out| out.status.success()))
}

fn build_library(compiler: &str, source: &str, out: &Path) {
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();
    let src = out.with_extension("c");
    std::fs::write(&src, source).unwrap();
    let status = Command::new(compiler)
        .args(["-shared", "-fPIC", "-O1", "-o"])
        .arg(out)
        .arg(&src)
        .status()
        .unwrap();
    assert!(status.success(), "failed to compile {}", src.display());
}

const COUNTER_SOURCE: &str = r#"
#include <stddef.h>
#include <stdint.h>

void k_abcd1234(void **args, size_t num_args) {
    int32_t *counter = (int32_t *)args[0];
    counter[0] += 1;
    counter[1] = (int32_t)num_args;
}
"#;

fn context_in(dir: &Path) -> KernelContext {
    KernelContext::new(RuntimeConfig::default().with_root_dir(dir).with_max_cache_size(CacheCapacity::Unbounded)).unwrap()
}

#[test]
fn repeated_runs_load_the_artifact_once() {
    let Some(compiler) = find_compiler() else {
        eprintln!("skipping: no C compiler found");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path());
    build_library(compiler, COUNTER_SOURCE, &ctx.build_root().artifact_path("foo"));
    assert!(!ctx.not_built("foo"));

    let kernel = KernelId::from("k_abcd1234");
    let mut counter = [0i32; 2];
    for _ in 0..2 {
        let args = KernelArgs::new().output(&mut counter);
        // SAFETY: the entry point reads one int32[2] buffer.
        unsafe { ctx.run(&kernel, "foo", &args) }.unwrap();
    }

    assert_eq!(counter, [2, 1]);
    let stats = ctx.stats();
    assert_eq!(stats.artifact_loads, 1);
    assert_eq!((stats.artifacts.hits, stats.artifacts.misses), (1, 1));
}

#[test]
fn missing_entry_point_is_distinguished_from_missing_artifact() {
    let Some(compiler) = find_compiler() else {
        eprintln!("skipping: no C compiler found");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("build/foo/lib.so");
    build_library(compiler, COUNTER_SOURCE, &path);

    let handle = ArtifactHandle::open(&path).unwrap();
    assert!(handle.has_entry_point("k_abcd1234"));
    assert_eq!(handle.resolve("k_abcd1234").unwrap().name(), "k_abcd1234");
    match handle.resolve("k_missing") {
        Err(KernelError::SymbolNotFound { entry_point, .. }) => assert_eq!(entry_point, "k_missing"),
        other => panic!("unexpected result: {other:?}"),
    }
}

fn gemm_source(entry_point: &str) -> String {
    format!(
        r#"
#include <stddef.h>
#include <stdint.h>
#include <string.h>

void {entry_point}(void **args, size_t num_args) {{
    const int8_t *xq = (const int8_t *)args[0];
    const int8_t *wq = (const int8_t *)args[1];
    const float *x_scale = (const float *)args[2];
    const float *w_scale = (const float *)args[3];
    uint16_t *out = (uint16_t *)args[4];
    int32_t m = *(const int32_t *)args[5];
    int32_t n = *(const int32_t *)args[6];
    int32_t k = *(const int32_t *)args[7];
    (void)num_args;
    for (int32_t i = 0; i < m; ++i) {{
        for (int32_t j = 0; j < n; ++j) {{
            int32_t acc = 0;
            for (int32_t p = 0; p < k; ++p) {{
                acc += (int32_t)xq[i * k + p] * (int32_t)wq[j * k + p];
            }}
            float value = (float)acc * x_scale[i] * w_scale[j];
            uint32_t bits;
            memcpy(&bits, &value, sizeof bits);
            out[i * n + j] = (uint16_t)(bits >> 16);
        }}
    }}
}}
"#
    )
}

#[test]
fn gemm_front_end_invokes_selected_variant() {
    let Some(compiler) = find_compiler() else {
        eprintln!("skipping: no C compiler found");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path());
    build_library(compiler, &gemm_source(&TUNED_M16.entry_point()), &ctx.build_root().artifact_path(GEMM_A8W8_MODULE));

    let (m, n, k) = (2, 3, 4);
    let dispatcher = GemmA8W8Dispatcher::from_entries([(ShapeKey::new(16, n, k), TUNED_M16)]);
    let inputs = GemmA8W8Inputs {
        xq: TensorDesc::new(Dtype::I8, [m, k]),
        wq: TensorDesc::new(Dtype::I8, [n, k]),
        x_scale: TensorDesc::new(Dtype::F32, [m]),
        w_scale: TensorDesc::new(Dtype::F32, [n]),
        out: TensorDesc::new(Dtype::BF16, [m, n]),
    };
    let xq: [i8; 8] = [1, 2, 3, 4, -1, 0, 1, 0];
    let wq: [i8; 12] = [1, 0, 0, 0, 0, 1, 0, 0, 1, 1, 1, 1];
    let x_scale = [1.0f32, 2.0];
    let w_scale = [1.0f32, 1.0, 0.5];
    let mut out = [0u16; 6];

    let args = gemm_a8w8_args(&xq, &wq, &x_scale, &w_scale, &mut out, ShapeKey::new(m, n, k)).unwrap();
    // SAFETY: buffers match the descriptors and the compiled argument order.
    let selection = unsafe { GemmA8W8::new(&ctx, &dispatcher).run(&inputs, &args) }.unwrap();
    drop(args);

    assert_eq!(selection.variant, TUNED_M16);
    assert_eq!(selection.source, VariantSource::Padded);
    let values: Vec<f32> = out.iter().map(|bits| f32::from_bits(u32::from(*bits) << 16)).collect();
    assert_eq!(values, [1.0, 2.0, 5.0, -2.0, 0.0, 0.0]);
}
