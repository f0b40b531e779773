//! Shared process environment helpers for the aiter kernel runtime.

pub mod environment;

pub use environment::{
    EnvVar, Environment, guard::EnvVarGuard, instrument::{
        InstrumentEnvVar, LOG_LEVEL, METRICS_CONSOLE, METRICS_JSONL_PATH
    }, jit::{CacheCapacity, HOME_DIR, JitEnvVar, MAX_CACHE_SIZE, ROOT_DIR}, value::{
        EnvVarError, EnvVarFormatError, EnvVarParseError, TypedEnvVar, TypedEnvVarGuard
    }
};

/// Returns true when the variable is present in the process environment, regardless of its value.
#[inline]
pub fn is_set(var: impl Into<EnvVar>) -> bool {
    Environment::get(var).is_some()
}
