//! Developer-facing macros for emitting structured metric events.

/// Emit a [`MetricEvent`](crate::MetricEvent) on the `metrics` tracing target.
///
/// The event is serialised to JSON and picked up by [`MetricsLayer`](crate::MetricsLayer)
/// when one is installed; otherwise it costs a disabled tracing callsite.
#[macro_export]
macro_rules! record_metric {
    ($event:expr) => {{
        if tracing::enabled!(target: "metrics", tracing::Level::INFO) {
            if let Ok(__metric_json) = $crate::prelude::serde_json::to_string(&$event) {
                tracing::event!(
                    target: "metrics",
                    tracing::Level::INFO,
                    metric = %__metric_json
                );
            }
        }
    }};
}
