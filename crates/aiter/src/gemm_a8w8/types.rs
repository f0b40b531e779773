use std::fmt;

/// Problem size of `out[M, N] = xq[M, K] * wq[N, K]^T`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeKey {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

impl ShapeKey {
    pub const fn new(m: usize, n: usize, k: usize) -> Self {
        Self { m, n, k }
    }

    #[must_use]
    pub const fn with_m(self, m: usize) -> Self {
        Self { m, ..self }
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M={} N={} K={}", self.m, self.n, self.k)
    }
}

/// Block pipeline scheduling of the compiled kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheduler {
    Intrawave,
    Interwave,
}

impl Scheduler {
    const fn name(self) -> &'static str {
        match self {
            Scheduler::Intrawave => "intrawave",
            Scheduler::Interwave => "interwave",
        }
    }
}

/// Tile configuration a variant was compiled with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GemmTile {
    pub block_size: u32,
    pub m_per_block: u32,
    pub n_per_block: u32,
    pub k_per_block: u32,
    pub scheduler: Scheduler,
    pub pipeline: u8,
}

/// One precompiled a8w8 GEMM kernel.
///
/// The variant is identified by its tile, and its entry point in the module
/// library is named after it, e.g. `a8w8_rowwise_256x128x128x64_intrawave_v3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GemmVariant {
    pub tile: GemmTile,
}

impl GemmVariant {
    pub const fn new(block_size: u32, m_per_block: u32, n_per_block: u32, k_per_block: u32, scheduler: Scheduler, pipeline: u8) -> Self {
        Self {
            tile: GemmTile {
                block_size,
                m_per_block,
                n_per_block,
                k_per_block,
                scheduler,
                pipeline,
            },
        }
    }

    pub fn entry_point(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GemmVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.tile;
        write!(
            f,
            "a8w8_rowwise_{}x{}x{}x{}_{}_v{}",
            t.block_size,
            t.m_per_block,
            t.n_per_block,
            t.k_per_block,
            t.scheduler.name(),
            t.pipeline
        )
    }
}
