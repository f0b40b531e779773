//! Typed environment variable descriptors and guard helpers.
//!
//! [`TypedEnvVar`] pairs an [`EnvVar`] with parse and format callbacks so call
//! sites read configuration as typed values instead of raw strings. Scoped
//! guards restore the previous process environment when dropped.
//!
//! # Examples
//!
//! ```
//! use aiter_env::{CacheCapacity, MAX_CACHE_SIZE};
//!
//! let guard = MAX_CACHE_SIZE.set_guard(CacheCapacity::bounded(8)).expect("set capacity");
//! assert_eq!(*guard, CacheCapacity::bounded(8));
//! ```

use std::{fmt, marker::PhantomData, ops::Deref, sync::OnceLock};

use super::{EnvVar, Environment, guard::EnvVarGuard};

/// Errors emitted when interacting with typed environment variables.
#[derive(Debug, thiserror::Error)]
pub enum EnvVarError {
    /// The environment value could not be parsed into the desired type.
    #[error("failed to parse environment variable {name} from '{value}': {source}")]
    Parse {
        name: &'static str,
        value: String,
        source: EnvVarParseError,
    },
    /// The provided value could not be formatted for storage.
    #[error("failed to format environment variable {name}: {source}")]
    Format { name: &'static str, source: EnvVarFormatError },
}

/// Error produced by a [`TypedEnvVar`] parsing callback.
#[derive(Debug, Clone)]
pub struct EnvVarParseError {
    message: String,
}

impl EnvVarParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for EnvVarParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EnvVarParseError {}

/// Error produced by a [`TypedEnvVar`] formatting callback.
#[derive(Debug, Clone)]
pub struct EnvVarFormatError {
    message: String,
}

impl EnvVarFormatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for EnvVarFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EnvVarFormatError {}

/// Callback used to parse an environment string into a concrete value.
pub type ParseFn<T> = fn(&str) -> Result<T, EnvVarParseError>;
/// Callback used to format a typed value before storing it in the environment.
pub type FormatFn<T> = fn(&T) -> Result<String, EnvVarFormatError>;

/// Descriptor for a strongly-typed environment variable.
#[derive(Clone, Copy)]
pub struct TypedEnvVar<T> {
    var: EnvVar,
    parse: ParseFn<T>,
    format: FormatFn<T>,
    _marker: PhantomData<T>,
}

impl<T> TypedEnvVar<T> {
    /// Create a new typed descriptor using the provided callbacks.
    pub const fn new(var: EnvVar, parse: ParseFn<T>, format: FormatFn<T>) -> Self {
        Self {
            var,
            parse,
            format,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.var.key()
    }

    #[must_use]
    pub const fn var(&self) -> EnvVar {
        self.var
    }

    fn format_value(&self, value: &T) -> Result<String, EnvVarError> {
        (self.format)(value).map_err(|source| EnvVarError::Format { name: self.key(), source })
    }

    /// Read the environment variable and parse it into the typed value.
    ///
    /// Returns `Ok(None)` when the variable is absent.
    pub fn get(&self) -> Result<Option<T>, EnvVarError> {
        match Environment::get(self.var) {
            Some(raw) => (self.parse)(&raw).map(Some).map_err(|source| EnvVarError::Parse {
                name: self.key(),
                value: raw,
                source,
            }),
            None => Ok(None),
        }
    }

    /// Read the variable, routing malformed values through `on_error`.
    ///
    /// The callback decides whether a bad value degrades to a fallback (returning
    /// `Some`) or is treated as absent (returning `None`).
    pub fn get_or_else(&self, on_error: impl FnOnce(EnvVarError) -> Option<T>) -> Option<T> {
        match self.get() {
            Ok(value) => value,
            Err(err) => on_error(err),
        }
    }

    /// Read and latch the first value observed for this descriptor.
    ///
    /// Once latched, later process-environment mutations of the same variable are
    /// not observed. Malformed values are routed through `on_error` exactly once.
    pub fn get_cached_or_else(&self, cache: &'static OnceLock<Option<T>>, on_error: impl FnOnce(EnvVarError) -> Option<T>) -> Option<T>
    where
        T: Clone,
    {
        cache.get_or_init(|| self.get_or_else(on_error)).clone()
    }

    /// Set the environment variable to the provided typed value.
    pub fn set(&self, value: T) -> Result<(), EnvVarError> {
        let formatted = self.format_value(&value)?;
        Environment::set(self.var, &formatted);
        Ok(())
    }

    /// Remove the environment variable from the process environment.
    pub fn unset(&self) {
        Environment::remove(self.var);
    }

    /// Set the environment variable for the lifetime of the returned guard.
    pub fn set_guard(&self, value: T) -> Result<TypedEnvVarGuard<'_, T>, EnvVarError> {
        let formatted = self.format_value(&value)?;
        let previous = Environment::get(self.var);
        Environment::set(self.var, &formatted);
        Ok(TypedEnvVarGuard {
            descriptor: self,
            previous,
            value,
        })
    }

    /// Unset the environment variable for the lifetime of the guard.
    #[must_use]
    pub fn unset_guard(&self) -> EnvVarGuard {
        EnvVarGuard::unset(self.var)
    }
}

/// Guard that restores the previous state of a typed environment variable.
pub struct TypedEnvVarGuard<'a, T> {
    descriptor: &'a TypedEnvVar<T>,
    previous: Option<String>,
    value: T,
}

impl<T> Deref for TypedEnvVarGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> Drop for TypedEnvVarGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(previous) = &self.previous {
            Environment::set(self.descriptor.var, previous);
        } else {
            Environment::remove(self.descriptor.var);
        }
    }
}
