//! Content-addressed kernel identifiers.
//!
//! A call signature is an ordered list of argument tokens. The tokens are
//! joined with [`SIGNATURE_DELIMITER`] and lower-cased into a canonical string,
//! and the identifier is `<module>_<md5 hex of canonical string>`. Identical
//! canonical strings always produce identical identifiers across processes.

use std::borrow::Borrow;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use md5::{Digest, Md5};

pub const SIGNATURE_DELIMITER: &str = "_";

/// Ordered argument tokens describing one call of a kernel module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgumentSignature {
    tokens: Vec<String>,
}

impl ArgumentSignature {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn arg(mut self, token: impl fmt::Display) -> Self {
        self.tokens.push(token.to_string());
        self
    }

    pub fn push(&mut self, token: impl fmt::Display) {
        self.tokens.push(token.to_string());
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn canonical(&self) -> String {
        canonicalize(&self.tokens)
    }
}

impl<S: Into<String>> FromIterator<S> for ArgumentSignature {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Join tokens with the delimiter and lower-case the result.
///
/// No escaping is applied: `["a_b", "c"]` and `["a", "b_c"]` canonicalise to
/// the same string and therefore to the same kernel.
pub fn canonicalize<S: AsRef<str>>(args: &[S]) -> String {
    let mut canonical = String::with_capacity(args.iter().map(|arg| arg.as_ref().len() + 1).sum());
    for (idx, arg) in args.iter().enumerate() {
        if idx > 0 {
            canonical.push_str(SIGNATURE_DELIMITER);
        }
        canonical.push_str(arg.as_ref());
    }
    canonical.to_lowercase()
}

/// Lower-case hex MD5 of `canonical`, two digits per byte (32 characters).
pub fn digest(canonical: &str) -> String {
    let hash = Md5::digest(canonical.as_bytes());
    let mut hex = String::with_capacity(hash.len() * 2);
    for byte in hash.iter() {
        // Writing into a String cannot fail.
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Identifier of a compiled kernel; also the name of its entry point.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KernelId(Arc<str>);

impl KernelId {
    /// Derive the identifier for a module and a canonical signature string.
    pub fn derive(module_name: &str, canonical: &str) -> Self {
        Self(format!("{module_name}{SIGNATURE_DELIMITER}{}", digest(canonical)).into())
    }

    pub fn for_signature(module_name: &str, signature: &ArgumentSignature) -> Self {
        Self::derive(module_name, &signature.canonical())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KernelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for KernelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KernelId {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<String> for KernelId {
    fn from(name: String) -> Self {
        Self(name.into())
    }
}

#[cfg(test)]
#[path = "signature.test.rs"]
mod tests;
