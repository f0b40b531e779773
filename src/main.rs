use aiter::gemm_a8w8::{GemmA8W8Dispatcher, ShapeKey};
use aiter::{ArtifactHandle, KernelContext, KernelError};
use aiter_instrumentation::config::AppConfig;
use aiter_instrumentation::logging::init_tracing;
use anyhow::Result;
use serde_json::json;

mod cli;

use cli::{CliConfig, CliError, Command, OutputFormat};

fn main() -> Result<()> {
    let config = match CliConfig::from_args(std::env::args_os()) {
        Ok(config) => config,
        // Help and version requests print to stdout and exit cleanly.
        Err(CliError::ArgParseError(err)) if !err.use_stderr() => err.exit(),
        Err(err) => return Err(err.into()),
    };
    config.validate()?;

    let app_config = AppConfig::from_env().map_err(CliError::from)?.with_verbosity(config.verbose);
    init_tracing(&app_config);

    let report = run(&config.command)?;
    match config.output_format {
        OutputFormat::Json => println!("{report}"),
        OutputFormat::Text => {
            if let Some(fields) = report.as_object() {
                for (key, value) in fields {
                    match value.as_str() {
                        Some(text) => println!("{key}: {text}"),
                        None => println!("{key}: {value}"),
                    }
                }
            }
        }
    }
    Ok(())
}

fn run(command: &Command) -> Result<serde_json::Value, CliError> {
    match command {
        Command::Name { module, args } => {
            let ctx = KernelContext::global()?;
            let kernel = ctx.kernel_name(module, args);
            Ok(json!({ "module": module, "kernel": kernel.as_str() }))
        }
        Command::Status { folder } => {
            let ctx = KernelContext::global()?;
            let root = ctx.build_root();
            Ok(json!({
                "build_root": root.path().display().to_string(),
                "artifact": root.artifact_path(folder).display().to_string(),
                "built": !ctx.not_built(folder),
            }))
        }
        Command::Select { m, n, k } => {
            let selection = GemmA8W8Dispatcher::global().select(ShapeKey::new(*m, *n, *k));
            Ok(json!({
                "variant": selection.variant.entry_point(),
                "source": selection.source.to_string(),
                "table_key": selection.key.to_string(),
            }))
        }
        Command::Probe { folder, entry } => {
            let ctx = KernelContext::global()?;
            let path = ctx.build_root().artifact_path(folder);
            let outcome = ArtifactHandle::open(&path).and_then(|handle| handle.resolve(entry).map(|_| ()));
            let status = match &outcome {
                Ok(()) => "ok",
                Err(KernelError::ArtifactMissing { .. }) => "not_built",
                Err(KernelError::Load { .. }) => "load_failed",
                Err(KernelError::SymbolNotFound { .. }) => "entry_point_missing",
                Err(_) => "error",
            };
            let mut report = json!({
                "artifact": path.display().to_string(),
                "entry_point": entry,
                "status": status,
            });
            if let Err(err) = outcome {
                report["error"] = json!(err.to_string());
            }
            Ok(report)
        }
    }
}
