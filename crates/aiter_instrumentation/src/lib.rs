//! Logging and structured metrics for the aiter kernel runtime.

pub mod config;
pub mod event;
pub mod exporters;
pub mod logging;
pub mod macros;
pub mod prelude;
pub mod recorder;

pub use event::{CacheKind, MetricEvent, VariantSource};
pub use recorder::{EnrichedMetricEvent, MetricExporter, MetricsLayer};

#[cfg(test)]
mod tests;
