use super::*;
use crate::caching::CacheCapacity;
use crate::config::RuntimeConfig;

fn inputs(m: usize, n: usize, k: usize) -> GemmA8W8Inputs {
    GemmA8W8Inputs {
        xq: TensorDesc::new(Dtype::I8, [m, k]),
        wq: TensorDesc::new(Dtype::I8, [n, k]),
        x_scale: TensorDesc::new(Dtype::F32, [m, 1]),
        w_scale: TensorDesc::new(Dtype::F32, [n]),
        out: TensorDesc::new(Dtype::BF16, [m, n]),
    }
}

fn expect_unsupported(inputs: &GemmA8W8Inputs, needle: &str) {
    match inputs.problem() {
        Err(KernelError::UnsupportedInput { operation, reason }) => {
            assert_eq!(operation, "gemm_a8w8");
            assert!(reason.contains(needle), "{reason}");
        }
        other => panic!("expected unsupported input, got {other:?}"),
    }
}

#[test]
fn valid_inputs_yield_problem_size() {
    assert_eq!(inputs(32, 1280, 8192).problem().unwrap(), ShapeKey::new(32, 1280, 8192));

    let mut f16_out = inputs(4, 8, 16);
    f16_out.out.dtype = Dtype::F16;
    assert!(f16_out.problem().is_ok());
}

#[test]
fn rejects_wrong_dtypes() {
    let mut bad = inputs(4, 8, 16);
    bad.xq.dtype = Dtype::BF16;
    expect_unsupported(&bad, "xq must be int8");

    let mut bad = inputs(4, 8, 16);
    bad.w_scale.dtype = Dtype::F16;
    expect_unsupported(&bad, "w_scale must be fp32");

    let mut bad = inputs(4, 8, 16);
    bad.out.dtype = Dtype::F32;
    expect_unsupported(&bad, "bf16 or fp16");
}

#[test]
fn rejects_mismatched_shapes() {
    let mut bad = inputs(4, 8, 16);
    bad.wq.shape = vec![8, 32];
    expect_unsupported(&bad, "inner dimensions differ");

    let mut bad = inputs(4, 8, 16);
    bad.xq.shape = vec![4, 16, 1];
    expect_unsupported(&bad, "xq must be 2-D");

    let mut bad = inputs(4, 8, 16);
    bad.x_scale.shape = vec![5];
    expect_unsupported(&bad, "x_scale must hold 4 scales");

    let mut bad = inputs(4, 8, 16);
    bad.out.shape = vec![8, 4];
    expect_unsupported(&bad, "out must have shape [4, 8]");

    expect_unsupported(&inputs(0, 8, 16), "empty problem");
}

#[test]
fn signature_uses_descriptor_tokens() {
    let signature = inputs(16, 32, 64).signature();
    assert_eq!(
        signature.canonical(),
        "int8[16x64]_int8[32x64]_fp32[16x1]_fp32[32]_bf16[16x32]"
    );
}

#[test]
fn descriptor_signature_names_the_dynamic_kernel() {
    let ctx: KernelContext = KernelContext::new(RuntimeConfig::default().with_home_dir("/nonexistent")).unwrap();
    let signature = inputs(16, 32, 64).signature();

    let kernel = ctx.names().get_or_create_signature("module_gemm_a8w8_dyn", &signature);
    let again = ctx.names().get_or_create_signature("module_gemm_a8w8_dyn", &inputs(16, 32, 64).signature());

    assert_eq!(kernel, again);
    assert_eq!(kernel, KernelId::for_signature("module_gemm_a8w8_dyn", &signature));
    assert_ne!(
        kernel,
        ctx.names().get_or_create_signature("module_gemm_a8w8_dyn", &inputs(32, 32, 64).signature())
    );
    let names = ctx.stats().names;
    assert_eq!((names.hits, names.misses, names.size), (1, 2, 2));
}

#[test]
fn run_reports_missing_module_after_selection() {
    let dir = tempfile::tempdir().unwrap();
    let ctx: KernelContext =
        KernelContext::new(RuntimeConfig::default().with_root_dir(dir.path()).with_max_cache_size(CacheCapacity::Unbounded)).unwrap();
    let dispatcher = GemmA8W8Dispatcher::new();
    let op = GemmA8W8::new(&ctx, &dispatcher);

    // SAFETY: the module is not built, so nothing is invoked.
    let err = unsafe { op.run(&inputs(16, 1280, 8192), &KernelArgs::new()) }.unwrap_err();
    match err {
        KernelError::ArtifactMissing { path } => {
            assert_eq!(path, dir.path().join(".aiter/build/module_gemm_a8w8/lib.so"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ctx.stats().artifact_loads, 0);
}

#[test]
fn run_validates_before_touching_disk() {
    let ctx: KernelContext = KernelContext::new(RuntimeConfig::default().with_home_dir("/nonexistent")).unwrap();
    let op = GemmA8W8::with_global_table(&ctx);
    let mut bad = inputs(4, 8, 16);
    bad.wq.dtype = Dtype::F32;

    // SAFETY: validation fails first.
    let err = unsafe { op.run(&bad, &KernelArgs::new()) }.unwrap_err();
    assert!(matches!(err, KernelError::UnsupportedInput { .. }));
}

#[test]
fn args_pack_has_eight_entries() {
    let (xq, wq, xs, ws) = ([0i8; 4], [0i8; 4], [1.0f32; 2], [1.0f32; 2]);
    let mut out = [0u16; 4];
    let args = gemm_a8w8_args(&xq, &wq, &xs, &ws, &mut out, ShapeKey::new(2, 2, 2)).unwrap();
    assert_eq!(args.len(), 8);
}
