//! Temporary overrides of `AITER_*` and related variables, undone on drop.

use std::sync::MutexGuard;

use super::{EnvVar, Environment};

/// Holds an override of one variable and puts back the value it displaced.
///
/// Both the override and the restore happen under [`Environment::lock`], so
/// guards taken on different threads never interleave their writes.
pub struct EnvVarGuard {
    var: EnvVar,
    displaced: Option<String>,
}

impl EnvVarGuard {
    /// Override `var` with `value` until the guard drops.
    pub fn set(var: impl Into<EnvVar>, value: &str) -> Self {
        Self::swap(var.into(), Some(value))
    }

    /// Remove `var` until the guard drops.
    pub fn unset(var: impl Into<EnvVar>) -> Self {
        Self::swap(var.into(), None)
    }

    fn swap(var: EnvVar, value: Option<&str>) -> Self {
        let mut lock = Environment::lock();
        let displaced = Environment::get(var);
        write(var, value, &mut lock);
        Self { var, displaced }
    }
}

fn write(var: EnvVar, value: Option<&str>, lock: &mut MutexGuard<'static, ()>) {
    match value {
        Some(value) => Environment::set_locked(var, value, lock),
        None => Environment::remove_locked(var, lock),
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let mut lock = Environment::lock();
        write(self.var, self.displaced.as_deref(), &mut lock);
    }
}
