//! Subscriber construction for binaries and long-running embedders.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::exporters::{ConsoleExporter, JsonlExporter};
use crate::recorder::{MetricExporter, MetricsLayer};

/// Build the exporters requested by `config`.
///
/// A JSONL path that cannot be opened is logged and skipped rather than failing startup.
pub fn exporters_for(config: &AppConfig) -> Vec<Box<dyn MetricExporter>> {
    let mut exporters: Vec<Box<dyn MetricExporter>> = Vec::new();
    if let Some(path) = &config.metrics_jsonl_path {
        match JsonlExporter::new(path) {
            Ok(exporter) => exporters.push(Box::new(exporter)),
            Err(error) => eprintln!("[aiter] cannot open metrics file {}: {error}", path.display()),
        }
    }
    if config.enable_console_metrics {
        exporters.push(Box::new(ConsoleExporter));
    }
    exporters
}

/// Install the global subscriber: a fmt layer on stderr filtered at `config.log_level`
/// (metric events excluded) plus a [`MetricsLayer`] when any exporter is configured.
///
/// Returns `false` when another subscriber was already installed.
pub fn init_tracing(config: &AppConfig) -> bool {
    let level = LevelFilter::from_level(config.log_level);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(tracing_subscriber::filter::filter_fn(move |meta: &tracing::Metadata<'_>| {
            meta.target() != "metrics" && *meta.level() <= level
        }));

    let metrics = MetricsLayer::new(exporters_for(config));
    let metrics_layer = (!metrics.is_empty()).then_some(metrics);

    tracing_subscriber::registry().with(fmt_layer).with(metrics_layer).try_init().is_ok()
}
