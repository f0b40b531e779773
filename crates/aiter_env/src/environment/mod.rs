//! Process environment abstractions shared by the runtime and instrumentation crates.

pub mod guard;
pub mod instrument;
pub mod jit;
pub mod value;

use std::sync::{Mutex, MutexGuard, OnceLock};

use instrument::InstrumentEnvVar;
use jit::JitEnvVar;

/// Namespaced environment variable identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnvVar {
    /// Variables that steer kernel resolution and the artifact caches.
    Jit(JitEnvVar),
    /// Variables specific to logging and metrics.
    Instrument(InstrumentEnvVar),
}

impl From<JitEnvVar> for EnvVar {
    fn from(value: JitEnvVar) -> Self {
        Self::Jit(value)
    }
}

impl From<InstrumentEnvVar> for EnvVar {
    fn from(value: InstrumentEnvVar) -> Self {
        Self::Instrument(value)
    }
}

impl EnvVar {
    /// Retrieve the canonical environment variable key for the identifier.
    pub const fn key(self) -> &'static str {
        match self {
            EnvVar::Jit(inner) => inner.key(),
            EnvVar::Instrument(inner) => inner.key(),
        }
    }
}

/// Process environment facade that centralises access and synchronisation.
pub struct Environment;

impl Environment {
    /// Acquire the global environment mutex, ensuring serialised mutations.
    pub fn lock() -> MutexGuard<'static, ()> {
        static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_MUTEX.get_or_init(|| Mutex::new(())).lock().expect("environment mutex poisoned")
    }

    /// Read the environment variable as a UTF-8 string if present.
    pub fn get(var: impl Into<EnvVar>) -> Option<String> {
        let var = var.into();
        std::env::var(var.key()).ok()
    }

    /// Set the environment variable using the provided UTF-8 value.
    ///
    /// This acquires the global environment mutex. Prefer [`Environment::lock`]
    /// when batching several operations so they share a single critical section.
    pub fn set(var: impl Into<EnvVar>, value: &str) {
        let var = var.into();
        let mut guard = Self::lock();
        Self::set_locked(var, value, &mut guard);
    }

    /// Remove the environment variable from the process environment.
    pub fn remove(var: impl Into<EnvVar>) {
        let var = var.into();
        let mut guard = Self::lock();
        Self::remove_locked(var, &mut guard);
    }

    /// Set the environment variable while reusing an existing environment lock.
    ///
    /// # Safety
    ///
    /// `std::env::set_var` is `unsafe` because concurrent mutation of the process
    /// environment is undefined behaviour. The guard parameter proves the caller
    /// holds the global environment mutex.
    pub(crate) fn set_locked(var: EnvVar, value: &str, _guard: &mut MutexGuard<'static, ()>) {
        // SAFETY: the guard serialises every mutation performed through this facade.
        unsafe { std::env::set_var(var.key(), value) };
    }

    /// Remove the environment variable while reusing an existing environment lock.
    pub(crate) fn remove_locked(var: EnvVar, _guard: &mut MutexGuard<'static, ()>) {
        // SAFETY: same requirements as `set_locked`; the guard holds the global mutex.
        unsafe { std::env::remove_var(var.key()) };
    }
}
