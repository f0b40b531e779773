use tracing::debug_span;

use super::dispatcher::{GemmA8W8Dispatcher, Selection};
use super::types::ShapeKey;
use crate::artifact::{Artifact, KernelArgs};
use crate::context::KernelContext;
use crate::error::KernelError;
use crate::signature::{ArgumentSignature, KernelId};
use crate::tensor::{Dtype, TensorDesc};

/// Build folder holding every a8w8 GEMM variant.
pub const GEMM_A8W8_MODULE: &str = "module_gemm_a8w8";

const OPERATION: &str = "gemm_a8w8";

/// Descriptors of a row-wise scaled int8 GEMM:
/// `out[M, N] = (xq[M, K] * wq[N, K]^T) * x_scale[M] * w_scale[N]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GemmA8W8Inputs {
    pub xq: TensorDesc,
    pub wq: TensorDesc,
    pub x_scale: TensorDesc,
    pub w_scale: TensorDesc,
    pub out: TensorDesc,
}

impl GemmA8W8Inputs {
    /// Validate dtypes and shapes and return the problem size.
    pub fn problem(&self) -> Result<ShapeKey, KernelError> {
        let (m, k) = matrix("xq", &self.xq, Dtype::I8)?;
        let (n, wk) = matrix("wq", &self.wq, Dtype::I8)?;
        if k != wk {
            return Err(KernelError::unsupported_input(
                OPERATION,
                format!("inner dimensions differ: xq has K={k}, wq has K={wk}"),
            ));
        }
        if m == 0 || n == 0 || k == 0 {
            return Err(KernelError::unsupported_input(OPERATION, format!("empty problem M={m} N={n} K={k}")));
        }

        scale("x_scale", &self.x_scale, m)?;
        scale("w_scale", &self.w_scale, n)?;

        if !matches!(self.out.dtype, Dtype::BF16 | Dtype::F16) {
            return Err(KernelError::unsupported_input(
                OPERATION,
                format!("out must be bf16 or fp16, got {}", self.out.dtype),
            ));
        }
        if self.out.shape != [m, n] {
            return Err(KernelError::unsupported_input(
                OPERATION,
                format!("out must have shape [{m}, {n}], got {}", self.out),
            ));
        }
        Ok(ShapeKey::new(m, n, k))
    }

    /// Signature tokens for the dynamically built path.
    pub fn signature(&self) -> ArgumentSignature {
        ArgumentSignature::new()
            .arg(&self.xq)
            .arg(&self.wq)
            .arg(&self.x_scale)
            .arg(&self.w_scale)
            .arg(&self.out)
    }
}

fn matrix(name: &str, desc: &TensorDesc, dtype: Dtype) -> Result<(usize, usize), KernelError> {
    if desc.dtype != dtype {
        return Err(KernelError::unsupported_input(
            OPERATION,
            format!("{name} must be {dtype}, got {}", desc.dtype),
        ));
    }
    match desc.shape.as_slice() {
        &[rows, cols] => Ok((rows, cols)),
        _ => Err(KernelError::unsupported_input(OPERATION, format!("{name} must be 2-D, got {desc}"))),
    }
}

fn scale(name: &str, desc: &TensorDesc, len: usize) -> Result<(), KernelError> {
    if desc.dtype != Dtype::F32 {
        return Err(KernelError::unsupported_input(
            OPERATION,
            format!("{name} must be fp32, got {}", desc.dtype),
        ));
    }
    // Accept both [len] and [len, 1].
    let ok = matches!(desc.shape.as_slice(), &[l] | &[l, 1] if l == len);
    if !ok {
        return Err(KernelError::unsupported_input(
            OPERATION,
            format!("{name} must hold {len} scales, got {desc}"),
        ));
    }
    Ok(())
}

/// Front end for the statically compiled a8w8 GEMM.
pub struct GemmA8W8<'a, A: Artifact> {
    ctx: &'a KernelContext<A>,
    dispatcher: &'a GemmA8W8Dispatcher,
}

impl<'a, A: Artifact> GemmA8W8<'a, A> {
    pub fn new(ctx: &'a KernelContext<A>, dispatcher: &'a GemmA8W8Dispatcher) -> Self {
        Self { ctx, dispatcher }
    }

    pub fn with_global_table(ctx: &'a KernelContext<A>) -> Self {
        Self::new(ctx, GemmA8W8Dispatcher::global())
    }

    /// Validate, select a variant and call its entry point.
    ///
    /// The pack is forwarded unchanged; the compiled variants expect
    /// `xq, wq, x_scale, w_scale, out, M, N, K` with the dims as `i32`.
    ///
    /// # Safety
    /// `args` must describe live buffers matching `inputs`.
    pub unsafe fn run(&self, inputs: &GemmA8W8Inputs, args: &KernelArgs<'_>) -> Result<Selection, KernelError> {
        let shape = inputs.problem()?;
        let _span = debug_span!("gemm_a8w8", m = shape.m, n = shape.n, k = shape.k).entered();
        let selection = self.dispatcher.select(shape);

        if self.ctx.not_built(GEMM_A8W8_MODULE) {
            return Err(KernelError::ArtifactMissing {
                path: self.ctx.build_root().artifact_path(GEMM_A8W8_MODULE),
            });
        }
        let kernel = KernelId::from(selection.variant.entry_point());
        unsafe { self.ctx.run(&kernel, GEMM_A8W8_MODULE, args)? };
        Ok(selection)
    }
}

/// Argument pack in the order the compiled variants expect.
pub fn gemm_a8w8_args<'a>(
    xq: &'a [i8],
    wq: &'a [i8],
    x_scale: &'a [f32],
    w_scale: &'a [f32],
    out: &'a mut [u16],
    shape: ShapeKey,
) -> Result<KernelArgs<'a>, KernelError> {
    let dim = |value: usize| {
        i32::try_from(value).map_err(|_| KernelError::unsupported_input(OPERATION, format!("dimension {value} exceeds i32")))
    };
    Ok(KernelArgs::new()
        .input(xq)
        .input(wq)
        .input(x_scale)
        .input(w_scale)
        .output(out)
        .scalar(dim(shape.m)?)
        .scalar(dim(shape.n)?)
        .scalar(dim(shape.k)?))
}

#[cfg(test)]
#[path = "op_test.rs"]
mod op_test;
