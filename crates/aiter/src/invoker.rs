//! Executes a kernel by identifier, loading its artifact on first use.

use std::sync::Arc;

use tracing::trace;

use crate::artifact::{Artifact, ArtifactHandle, KernelArgs};
use crate::artifact_cache::ArtifactCache;
use crate::build_root::BuildRoot;
use crate::caching::CacheCapacity;
use crate::error::KernelError;
use crate::signature::KernelId;

pub struct KernelInvoker<A: Artifact = ArtifactHandle> {
    build_root: BuildRoot,
    artifacts: ArtifactCache<A>,
}

impl<A: Artifact> KernelInvoker<A> {
    pub fn new(build_root: BuildRoot, capacity: CacheCapacity) -> Self {
        Self {
            build_root,
            artifacts: ArtifactCache::new(capacity),
        }
    }

    pub fn build_root(&self) -> &BuildRoot {
        &self.build_root
    }

    pub fn artifacts(&self) -> &ArtifactCache<A> {
        &self.artifacts
    }

    /// True when the artifact for `folder` has not been built.
    pub fn not_built(&self, folder: &str) -> bool {
        self.build_root.not_built(folder)
    }

    /// Fetch the artifact for `kernel`, loading it from `folder` on a cache miss.
    pub fn artifact(&self, kernel: &KernelId, folder: &str) -> Result<Arc<A>, KernelError> {
        self.artifacts.get_or_load(kernel, || self.build_root.artifact_path(folder))
    }

    /// Run the entry point named by `kernel` from the artifact in `folder`.
    ///
    /// # Safety
    /// `args` must match the entry point's expected arguments.
    pub unsafe fn run(&self, kernel: &KernelId, folder: &str, args: &KernelArgs<'_>) -> Result<(), KernelError> {
        let artifact = self.artifact(kernel, folder)?;
        trace!(%kernel, folder, num_args = args.len(), "invoking kernel");
        unsafe { artifact.invoke(kernel.as_str(), args) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_without_artifact_reports_expected_path() {
        let dir = tempfile::tempdir().unwrap();
        let invoker: KernelInvoker = KernelInvoker::new(BuildRoot::at(dir.path()), CacheCapacity::Unbounded);
        let kernel = KernelId::from("k_abcd1234");

        assert!(invoker.not_built("k_abcd1234"));
        // SAFETY: the artifact is missing, so nothing is called.
        let err = unsafe { invoker.run(&kernel, "k_abcd1234", &KernelArgs::new()) }.unwrap_err();
        match err {
            KernelError::ArtifactMissing { path } => {
                assert_eq!(path, dir.path().join("build/k_abcd1234/lib.so"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(invoker.artifacts().is_empty());
    }
}
