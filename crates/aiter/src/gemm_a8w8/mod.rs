//! Row-wise scaled int8 GEMM: variant registry, shape dispatch and front end.

pub use aiter_instrumentation::VariantSource;
pub use dispatcher::{GemmA8W8Dispatcher, LARGEST_M_BUCKET, MAX_POW2_PADDED_M, Selection, heuristic, pad_m};
pub use op::{GEMM_A8W8_MODULE, GemmA8W8, GemmA8W8Inputs, gemm_a8w8_args};
pub use types::{GemmTile, GemmVariant, Scheduler, ShapeKey};

mod dispatcher;
mod op;
mod types;
pub mod variants;
