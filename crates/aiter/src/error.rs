use std::path::PathBuf;

use aiter_env::EnvVarError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    /// Neither a root override nor a home directory is available.
    #[error("cannot resolve the kernel build root: {0}")]
    Configuration(String),
    /// The artifact has not been built yet; run the build for its folder.
    #[error("kernel artifact not built: {} does not exist", path.display())]
    ArtifactMissing { path: PathBuf },
    /// The artifact exists but the dynamic loader rejected it.
    #[error("failed to load kernel artifact {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },
    /// The artifact loaded but does not export the requested entry point.
    #[error("entry point `{entry_point}` not found in {}: {reason}", path.display())]
    SymbolNotFound {
        entry_point: String,
        path: PathBuf,
        reason: String,
    },
    /// Operator inputs rejected by front-end validation.
    #[error("unsupported input for {operation}: {reason}")]
    UnsupportedInput { operation: &'static str, reason: String },
    #[error("environment error: {0}")]
    EnvVar(#[from] EnvVarError),
}

impl KernelError {
    pub fn unsupported_input(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedInput {
            operation,
            reason: reason.into(),
        }
    }

    /// True for errors that a build of the artifact's folder would resolve.
    pub fn needs_build(&self) -> bool {
        matches!(self, Self::ArtifactMissing { .. })
    }
}
