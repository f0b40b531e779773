//! Environment variables consulted by kernel resolution and the artifact caches.

use std::{fmt, num::NonZeroUsize, path::PathBuf};

use super::EnvVar;
use super::value::{EnvVarFormatError, EnvVarParseError, TypedEnvVar};

/// Kernel-runtime environment variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JitEnvVar {
    /// Overrides the directory under which `.aiter/build/<folder>/lib.so` is looked up.
    RootDir,
    /// Maximum number of entries held by each LRU cache; absent or non-positive means unbounded.
    MaxCacheSize,
    /// The user's home directory, used when no root override is set.
    Home,
}

impl JitEnvVar {
    pub const fn key(self) -> &'static str {
        match self {
            JitEnvVar::RootDir => "AITER_ROOT_DIR",
            JitEnvVar::MaxCacheSize => "AITER_MAX_CACHE_SIZE",
            JitEnvVar::Home => "HOME",
        }
    }

    pub const fn into_env(self) -> EnvVar {
        EnvVar::Jit(self)
    }
}

/// Capacity setting shared by the identifier and artifact caches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CacheCapacity {
    /// Never evict.
    #[default]
    Unbounded,
    /// Evict the least-recently-used entry once this many entries are held.
    Bounded(NonZeroUsize),
}

impl CacheCapacity {
    /// Bounded capacity of `entries`; zero collapses to [`CacheCapacity::Unbounded`].
    pub fn bounded(entries: usize) -> Self {
        NonZeroUsize::new(entries).map_or(Self::Unbounded, Self::Bounded)
    }

    /// Entry limit, or `None` when unbounded.
    pub fn limit(self) -> Option<NonZeroUsize> {
        match self {
            Self::Unbounded => None,
            Self::Bounded(limit) => Some(limit),
        }
    }
}

impl fmt::Display for CacheCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Bounded(limit) => write!(f, "{limit}"),
        }
    }
}

/// Typed descriptor for the build-root override.
pub const ROOT_DIR: TypedEnvVar<PathBuf> = TypedEnvVar::new(JitEnvVar::RootDir.into_env(), parse_dir, format_dir);

/// Typed descriptor for the home directory fallback.
pub const HOME_DIR: TypedEnvVar<PathBuf> = TypedEnvVar::new(JitEnvVar::Home.into_env(), parse_dir, format_dir);

/// Typed descriptor for the LRU capacity of both kernel caches.
pub const MAX_CACHE_SIZE: TypedEnvVar<CacheCapacity> =
    TypedEnvVar::new(JitEnvVar::MaxCacheSize.into_env(), parse_capacity, format_capacity);

fn parse_dir(value: &str) -> Result<PathBuf, EnvVarParseError> {
    if value.is_empty() {
        return Err(EnvVarParseError::new("directory must not be empty"));
    }
    Ok(PathBuf::from(value))
}

fn format_dir(path: &PathBuf) -> Result<String, EnvVarFormatError> {
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| EnvVarFormatError::new("directory is not valid UTF-8"))
}

fn parse_capacity(value: &str) -> Result<CacheCapacity, EnvVarParseError> {
    let entries: i64 = value
        .trim()
        .parse()
        .map_err(|_| EnvVarParseError::new("cache size is not an integer"))?;
    if entries <= 0 {
        return Ok(CacheCapacity::Unbounded);
    }
    usize::try_from(entries)
        .map(CacheCapacity::bounded)
        .map_err(|_| EnvVarParseError::new("cache size does not fit in usize"))
}

fn format_capacity(capacity: &CacheCapacity) -> Result<String, EnvVarFormatError> {
    Ok(match capacity {
        CacheCapacity::Unbounded => "-1".to_string(),
        CacheCapacity::Bounded(limit) => limit.to_string(),
    })
}
