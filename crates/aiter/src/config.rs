//! Runtime configuration resolved from the process environment.

use std::path::PathBuf;

use aiter_env::{CacheCapacity, HOME_DIR, MAX_CACHE_SIZE, ROOT_DIR};
use tracing::warn;

use crate::error::KernelError;

/// Settings consumed when a [`KernelContext`](crate::KernelContext) is built.
///
/// [`RuntimeConfig::from_env`] reads the process environment; tests and embedders
/// can construct one directly to avoid touching it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// `AITER_ROOT_DIR`; takes precedence over the home directory.
    pub root_dir_override: Option<PathBuf>,
    /// `HOME`, falling back to the platform home directory.
    pub home_dir: Option<PathBuf>,
    /// `AITER_MAX_CACHE_SIZE`, applied to both LRU caches.
    pub max_cache_size: CacheCapacity,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let root_dir_override = ROOT_DIR.get_or_else(|err| {
            warn!(error = %err, "ignoring malformed build root override");
            None
        });
        let home_dir = HOME_DIR
            .get_or_else(|err| {
                warn!(error = %err, "ignoring malformed home directory");
                None
            })
            .or_else(dirs::home_dir);
        let max_cache_size = MAX_CACHE_SIZE
            .get_or_else(|err| {
                warn!(error = %err, "treating malformed cache size as unbounded");
                Some(CacheCapacity::Unbounded)
            })
            .unwrap_or_default();

        Self {
            root_dir_override,
            home_dir,
            max_cache_size,
        }
    }

    /// Like [`from_env`](Self::from_env) but malformed values are errors.
    pub fn try_from_env() -> Result<Self, KernelError> {
        Ok(Self {
            root_dir_override: ROOT_DIR.get()?,
            home_dir: HOME_DIR.get()?.or_else(dirs::home_dir),
            max_cache_size: MAX_CACHE_SIZE.get()?.unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn with_root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir_override = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_max_cache_size(mut self, capacity: CacheCapacity) -> Self {
        self.max_cache_size = capacity;
        self
    }
}
