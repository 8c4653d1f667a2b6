use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::prediction::METRIC_PRERENDER;
use crate::application::render::{
    METRIC_FRAGMENT_FALLBACK, METRIC_FRAGMENT_RENDER, METRIC_RENDER_MS,
};
use crate::cache::{METRIC_BLOCK_CACHE_EVICT, METRIC_BLOCK_CACHE_HIT, METRIC_BLOCK_CACHE_MISS};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so preview HTML on stdout stays clean.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

/// Register descriptions for every metric the crate emits. Idempotent.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_BLOCK_CACHE_HIT,
            Unit::Count,
            "Total number of block cache hits."
        );
        describe_counter!(
            METRIC_BLOCK_CACHE_MISS,
            Unit::Count,
            "Total number of block cache misses."
        );
        describe_counter!(
            METRIC_BLOCK_CACHE_EVICT,
            Unit::Count,
            "Total number of block cache evictions due to capacity."
        );
        describe_counter!(
            METRIC_FRAGMENT_RENDER,
            Unit::Count,
            "Total number of renderer invocations, labelled by scope."
        );
        describe_counter!(
            METRIC_FRAGMENT_FALLBACK,
            Unit::Count,
            "Total number of fragments replaced by escaped plain text."
        );
        describe_counter!(
            METRIC_PRERENDER,
            Unit::Count,
            "Total number of predicted blocks handed out for pre-rendering."
        );
        describe_histogram!(
            METRIC_RENDER_MS,
            Unit::Milliseconds,
            "Preview render latency in milliseconds."
        );
    });
}
