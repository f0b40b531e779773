//! Loaded kernel libraries and the calling convention of their entry points.

use std::any::Any;
use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use tracing::debug;

use crate::error::KernelError;

/// Entry point exported by every kernel library.
///
/// `args` points at `num_args` argument pointers in call order; each one
/// addresses a device buffer, a host buffer or a scalar, as built by
/// [`KernelArgs`].
pub type KernelFn = unsafe extern "C" fn(args: *const *mut c_void, num_args: usize);

/// Argument pack handed to a [`KernelFn`].
///
/// Borrowed buffers must outlive the pack; scalars are copied into storage the
/// pack owns so their addresses stay valid until it is dropped.
#[derive(Default)]
pub struct KernelArgs<'a> {
    ptrs: Vec<*mut c_void>,
    owned: Vec<Box<dyn Any>>,
    _borrows: PhantomData<&'a mut ()>,
}

impl<'a> KernelArgs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host buffer the kernel reads.
    #[must_use]
    pub fn input<T>(mut self, data: &'a [T]) -> Self {
        self.ptrs.push(data.as_ptr().cast_mut().cast());
        self
    }

    /// Host buffer the kernel may write.
    #[must_use]
    pub fn output<T>(mut self, data: &'a mut [T]) -> Self {
        self.ptrs.push(data.as_mut_ptr().cast());
        self
    }

    /// Scalar passed by address.
    #[must_use]
    pub fn scalar<T: Copy + 'static>(mut self, value: T) -> Self {
        let boxed = Box::new(value);
        self.ptrs.push((&*boxed as *const T).cast_mut().cast());
        self.owned.push(boxed);
        self
    }

    /// Pointer owned elsewhere, e.g. device memory from another runtime.
    ///
    /// # Safety
    /// `ptr` must stay valid for as long as the pack is used.
    #[must_use]
    pub unsafe fn raw(mut self, ptr: *mut c_void) -> Self {
        self.ptrs.push(ptr);
        self
    }

    pub fn len(&self) -> usize {
        self.ptrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ptrs.is_empty()
    }

    pub fn as_ptr(&self) -> *const *mut c_void {
        self.ptrs.as_ptr()
    }
}

impl fmt::Debug for KernelArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelArgs").field("ptrs", &self.ptrs).finish()
    }
}

/// Something the artifact cache can load from a path and call into.
pub trait Artifact: Send + Sync + Sized + 'static {
    fn load(path: &Path) -> Result<Self, KernelError>;

    fn path(&self) -> &Path;

    fn has_entry_point(&self, entry_point: &str) -> bool;

    /// Call `entry_point` with `args`.
    ///
    /// # Safety
    /// The pack must match the entry point's expected arguments in number,
    /// order and pointee types.
    unsafe fn invoke(&self, entry_point: &str, args: &KernelArgs<'_>) -> Result<(), KernelError>;
}

/// A shared library opened with the platform dynamic loader.
///
/// The library is unloaded exactly once, when the last owner drops the handle.
pub struct ArtifactHandle {
    library: Library,
    path: PathBuf,
}

impl ArtifactHandle {
    /// Open the library at `path`; its initialisers run here.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, KernelError> {
        let path = path.into();
        if !path.exists() {
            return Err(KernelError::ArtifactMissing { path });
        }
        // SAFETY: kernel libraries are produced by the kernel build and have no
        // load-time side effects beyond registering their entry points.
        let library = unsafe { Library::new(&path) }.map_err(|err| KernelError::Load {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        debug!(path = %path.display(), "opened kernel artifact");
        Ok(Self { library, path })
    }

    /// Look up an exported entry point by name.
    pub fn resolve(&self, entry_point: &str) -> Result<EntryPoint<'_>, KernelError> {
        // SAFETY: every kernel entry point is declared with the `KernelFn` signature.
        let symbol = unsafe { self.library.get::<KernelFn>(entry_point.as_bytes()) }.map_err(|err| {
            KernelError::SymbolNotFound {
                entry_point: entry_point.to_string(),
                path: self.path.clone(),
                reason: err.to_string(),
            }
        })?;
        Ok(EntryPoint {
            name: entry_point.to_string(),
            symbol,
        })
    }
}

impl Artifact for ArtifactHandle {
    fn load(path: &Path) -> Result<Self, KernelError> {
        Self::open(path)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn has_entry_point(&self, entry_point: &str) -> bool {
        self.resolve(entry_point).is_ok()
    }

    unsafe fn invoke(&self, entry_point: &str, args: &KernelArgs<'_>) -> Result<(), KernelError> {
        let entry = self.resolve(entry_point)?;
        unsafe { entry.call(args) };
        Ok(())
    }
}

impl fmt::Debug for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactHandle").field("path", &self.path).finish_non_exhaustive()
    }
}

impl Drop for ArtifactHandle {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "unloading kernel artifact");
    }
}

/// Callable entry point borrowed from an [`ArtifactHandle`].
pub struct EntryPoint<'lib> {
    name: String,
    symbol: Symbol<'lib, KernelFn>,
}

impl EntryPoint<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// # Safety
    /// See [`Artifact::invoke`].
    pub unsafe fn call(&self, args: &KernelArgs<'_>) {
        unsafe { (*self.symbol)(args.as_ptr(), args.len()) }
    }
}

impl fmt::Debug for EntryPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_artifact_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.so");
        let err = ArtifactHandle::open(&path).unwrap_err();
        assert!(matches!(err, KernelError::ArtifactMissing { path: missing } if missing == path));
    }

    #[test]
    fn garbage_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.so");
        std::fs::write(&path, b"not a shared object").unwrap();
        assert!(matches!(ArtifactHandle::open(&path), Err(KernelError::Load { .. })));
    }

    #[test]
    fn args_pack_keeps_order_and_scalar_storage() {
        let input = [1.0f32, 2.0];
        let mut output = [0u8; 4];
        let args = KernelArgs::new().input(&input).output(&mut output).scalar(42i32);

        assert_eq!(args.len(), 3);
        // SAFETY: the pack was just built with three entries.
        let ptrs = unsafe { std::slice::from_raw_parts(args.as_ptr(), args.len()) };
        assert_eq!(ptrs[0].cast_const(), input.as_ptr().cast::<c_void>());
        // SAFETY: the third pointer addresses the boxed i32 scalar.
        assert_eq!(unsafe { *ptrs[2].cast::<i32>() }, 42);
    }
}
