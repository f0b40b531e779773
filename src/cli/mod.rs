//! Command-line parsing and configuration for the `aiter` tool.

pub mod config;
pub mod error;

pub use config::{CliConfig, Command, OutputFormat};
pub use error::CliError;
