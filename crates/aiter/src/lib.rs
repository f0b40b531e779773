//! Kernel resolution and execution cache.
//!
//! Turns call signatures into content-addressed kernel identifiers, loads the
//! prebuilt shared library for a kernel from the build root, keeps bounded LRU
//! caches of identifiers and loaded libraries, and picks among precompiled
//! int8 GEMM variants by problem shape.

pub use artifact::{Artifact, ArtifactHandle, EntryPoint, KernelArgs, KernelFn};
pub use artifact_cache::ArtifactCache;
pub use build_root::{ARTIFACT_FILE_NAME, BuildRoot, ROOT_NAMESPACE};
pub use caching::{CacheCapacity, CacheMetrics, CacheStats, LruCache};
pub use config::RuntimeConfig;
pub use context::KernelContext;
pub use error::KernelError;
pub use invoker::KernelInvoker;
pub use naming::IdentifierCache;
pub use signature::{ArgumentSignature, KernelId, canonicalize, digest};
pub use tensor::{Dtype, TensorDesc};

pub mod artifact;
pub mod artifact_cache;
pub mod build_root;
pub mod caching;
pub mod config;
pub mod context;
pub mod error;
pub mod gemm_a8w8;
pub mod invoker;
pub mod naming;
pub mod signature;
pub mod tensor;
