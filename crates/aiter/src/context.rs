//! Process-wide kernel state: configuration, build root and both caches.

use std::sync::OnceLock;

use tracing::info;

use crate::artifact::{Artifact, ArtifactHandle, KernelArgs};
use crate::build_root::BuildRoot;
use crate::caching::CacheStats;
use crate::config::RuntimeConfig;
use crate::error::KernelError;
use crate::invoker::KernelInvoker;
use crate::naming::IdentifierCache;
use crate::signature::KernelId;

/// Explicit owner of everything the kernel runtime caches.
///
/// Most callers use [`KernelContext::global`], which is built from the
/// environment exactly once per process. Tests and embedders that need
/// isolation construct their own with [`KernelContext::new`].
pub struct KernelContext<A: Artifact = ArtifactHandle> {
    config: RuntimeConfig,
    names: IdentifierCache,
    invoker: KernelInvoker<A>,
}

impl<A: Artifact> KernelContext<A> {
    pub fn new(config: RuntimeConfig) -> Result<Self, KernelError> {
        let build_root = BuildRoot::resolve(&config)?;
        info!(
            root = %build_root.path().display(),
            max_cache_size = %config.max_cache_size,
            "initialised kernel context"
        );
        Ok(Self {
            names: IdentifierCache::new(config.max_cache_size),
            invoker: KernelInvoker::new(build_root, config.max_cache_size),
            config,
        })
    }

    pub fn from_env() -> Result<Self, KernelError> {
        Self::new(RuntimeConfig::from_env())
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn build_root(&self) -> &BuildRoot {
        self.invoker.build_root()
    }

    pub fn names(&self) -> &IdentifierCache {
        &self.names
    }

    pub fn invoker(&self) -> &KernelInvoker<A> {
        &self.invoker
    }

    /// Content-addressed identifier for `module_name` called with `args`.
    pub fn kernel_name<S: AsRef<str>>(&self, module_name: &str, args: &[S]) -> KernelId {
        self.names.get_or_create(module_name, args)
    }

    pub fn not_built(&self, folder: &str) -> bool {
        self.invoker.not_built(folder)
    }

    /// # Safety
    /// See [`KernelInvoker::run`].
    pub unsafe fn run(&self, kernel: &KernelId, folder: &str, args: &KernelArgs<'_>) -> Result<(), KernelError> {
        unsafe { self.invoker.run(kernel, folder, args) }
    }

    pub fn stats(&self) -> CacheStats {
        let artifacts = self.invoker.artifacts();
        CacheStats {
            names: self.names.metrics(),
            artifacts: artifacts.metrics(),
            artifact_loads: artifacts.loads(),
        }
    }

    /// Drop every cached identifier and artifact reference.
    pub fn clear(&self) {
        self.names.clear();
        self.invoker.artifacts().clear();
    }
}

static GLOBAL: OnceLock<Result<KernelContext, String>> = OnceLock::new();

impl KernelContext {
    /// Shared context built from the environment on first use.
    ///
    /// Resolution runs once; a configuration failure is latched and returned to
    /// every later caller.
    pub fn global() -> Result<&'static KernelContext, KernelError> {
        match GLOBAL.get_or_init(|| KernelContext::from_env().map_err(|err| err.to_string())) {
            Ok(context) => Ok(context),
            Err(message) => Err(KernelError::Configuration(message.clone())),
        }
    }
}

#[cfg(test)]
#[path = "context.test.rs"]
mod tests;
