use std::ffi::OsString;

use clap::{Parser, Subcommand};

use super::error::CliError;

/// Command-line interface configuration for the `aiter` tool
#[derive(Debug, Parser)]
#[command(name = "aiter")]
#[command(about = "Inspect kernel identifiers, build artifacts and GEMM variant selection", long_about = None)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format (text, json)
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Print the kernel identifier for a module called with the given argument tokens
    Name {
        #[arg(value_name = "MODULE")]
        module: String,
        #[arg(value_name = "ARGS", required = true)]
        args: Vec<String>,
    },
    /// Report the build root and whether a module folder has been built
    Status {
        #[arg(value_name = "FOLDER")]
        folder: String,
    },
    /// Show which a8w8 GEMM variant a problem size dispatches to
    Select { m: usize, n: usize, k: usize },
    /// Load a module's artifact and resolve one entry point
    Probe {
        #[arg(value_name = "FOLDER")]
        folder: String,
        #[arg(value_name = "ENTRY")]
        entry: String,
    },
}

/// Output format options
#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per command
    Json,
}

impl CliConfig {
    /// Parse `args` (program name first) without exiting the process on failure.
    pub fn from_args<I, T>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?)
    }

    /// Reject values clap parses but the runtime cannot use.
    pub fn validate(&self) -> Result<(), CliError> {
        match &self.command {
            Command::Name { module, .. } if module.trim().is_empty() => Err(CliError::invalid_argument("module name must not be empty")),
            Command::Status { folder } | Command::Probe { folder, .. } if folder.trim().is_empty() || folder.contains('/') => {
                Err(CliError::invalid_argument(format!("`{folder}` is not a module folder name")))
            }
            Command::Select { m, n, k } if *m == 0 || *n == 0 || *k == 0 => {
                Err(CliError::invalid_argument(format!("dimensions must be positive, got M={m} N={n} K={k}")))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
