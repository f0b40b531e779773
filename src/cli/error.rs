use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Error when parsing command line arguments
    #[error("Failed to parse command line arguments: {0}")]
    ArgParseError(#[from] clap::Error),

    /// Argument values clap accepts but the runtime cannot use
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by the kernel runtime
    #[error(transparent)]
    Kernel(#[from] aiter::KernelError),

    /// Logging or metrics configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] aiter_instrumentation::config::AppConfigError),
}

impl CliError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
