//! Location of compiled kernel artifacts on disk.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::RuntimeConfig;
use crate::error::KernelError;

/// Directory appended to the override or home directory.
pub const ROOT_NAMESPACE: &str = ".aiter";
/// Subdirectory of the root holding one folder per built module.
pub const BUILD_DIR: &str = "build";
/// Fixed file name of the shared library inside a module folder.
pub const ARTIFACT_FILE_NAME: &str = "lib.so";

/// Resolved build root; artifacts live at `<root>/build/<folder>/lib.so`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildRoot {
    root: PathBuf,
}

impl BuildRoot {
    /// Resolve the root from configuration: the override wins over the home
    /// directory, and [`ROOT_NAMESPACE`] is appended to whichever is used.
    pub fn resolve(config: &RuntimeConfig) -> Result<Self, KernelError> {
        let base = match (&config.root_dir_override, &config.home_dir) {
            (Some(dir), _) => dir,
            (None, Some(home)) => home,
            (None, None) => {
                return Err(KernelError::Configuration(
                    "neither AITER_ROOT_DIR nor a home directory is available".to_string(),
                ));
            }
        };
        let root = base.join(ROOT_NAMESPACE);
        debug!(root = %root.display(), "resolved kernel build root");
        Ok(Self { root })
    }

    /// Use `root` as-is, without appending the namespace directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR)
    }

    pub fn module_dir(&self, folder: &str) -> PathBuf {
        self.build_dir().join(folder)
    }

    pub fn artifact_path(&self, folder: &str) -> PathBuf {
        self.module_dir(folder).join(ARTIFACT_FILE_NAME)
    }

    /// True when the module's shared library does not exist yet.
    pub fn not_built(&self, folder: &str) -> bool {
        !self.artifact_path(folder).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_fallback_appends_namespace() {
        let config = RuntimeConfig::default().with_home_dir("/home/u");
        let root = BuildRoot::resolve(&config).unwrap();
        assert_eq!(root.path(), Path::new("/home/u/.aiter"));
        assert_eq!(root.artifact_path("k_abcd1234"), PathBuf::from("/home/u/.aiter/build/k_abcd1234/lib.so"));
    }

    #[test]
    fn override_wins_over_home() {
        let config = RuntimeConfig::default().with_home_dir("/home/u").with_root_dir("/scratch");
        let root = BuildRoot::resolve(&config).unwrap();
        assert_eq!(root.module_dir("m"), PathBuf::from("/scratch/.aiter/build/m"));
    }

    #[test]
    fn missing_home_and_override_is_configuration_error() {
        let err = BuildRoot::resolve(&RuntimeConfig::default()).unwrap_err();
        assert!(matches!(err, KernelError::Configuration(_)));
    }

    #[test]
    fn not_built_tracks_artifact_presence() {
        let dir = tempfile::tempdir().unwrap();
        let root = BuildRoot::at(dir.path());
        assert!(root.not_built("module_x"));

        std::fs::create_dir_all(root.module_dir("module_x")).unwrap();
        assert!(root.not_built("module_x"));

        std::fs::write(root.artifact_path("module_x"), b"").unwrap();
        assert!(!root.not_built("module_x"));
    }
}
