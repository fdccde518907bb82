//! Metrics collection for `leveldeck`.
//!
//! Prometheus-compatible metrics recorded through the `metrics` facade.
//! Without an installed recorder every `record_*` call is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use leveldeck_core::ValidationKind;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::LevelDeckError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Lookup outcome labels. Anything else is bucketed as `"__unknown__"`.
const KNOWN_OUTCOMES: [&str; 4] = ["ok", "not_found", "invalid", "storage_error"];

/// Sanitizes a lookup outcome for use as a metrics label.
#[must_use]
pub fn sanitize_outcome_label(outcome: &str) -> &str {
    if KNOWN_OUTCOMES.contains(&outcome) {
        outcome
    } else {
        "__unknown__"
    }
}

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns `LevelDeckError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), LevelDeckError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| LevelDeckError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "leveldeck_lookups_total",
        "Total number of level lookups by outcome"
    );
    describe_histogram!(
        "leveldeck_lookup_duration_ms",
        "Level lookup duration in milliseconds"
    );
    describe_counter!(
        "leveldeck_validation_failures_total",
        "Level documents rejected by validation, by phase"
    );
    describe_counter!(
        "leveldeck_cache_hits_total",
        "Lookups served from the validation cache"
    );
    describe_gauge!("leveldeck_catalog_levels", "Levels in the catalog");
}

/// Records a completed lookup.
pub fn record_lookup(outcome: &str, duration: Duration) {
    let label = sanitize_outcome_label(outcome).to_owned();
    counter!("leveldeck_lookups_total", "outcome" => label).increment(1);
    histogram!("leveldeck_lookup_duration_ms").record(duration.as_secs_f64() * 1000.0);
}

/// Records a document rejected by validation.
pub fn record_validation_failure(kind: ValidationKind) {
    counter!("leveldeck_validation_failures_total", "kind" => kind.as_str()).increment(1);
}

/// Records a lookup served from the validation cache.
pub fn record_cache_hit() {
    counter!("leveldeck_cache_hits_total").increment(1);
}

/// Sets the catalog size gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_catalog_levels(count: usize) {
    gauge!("leveldeck_catalog_levels").set(count as f64);
}
