use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(logging.level).into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
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

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "pactum_cache_l1_hit_total",
            Unit::Count,
            "Total number of volatile-tier cache hits."
        );
        describe_counter!(
            "pactum_cache_l1_miss_total",
            Unit::Count,
            "Total number of volatile-tier cache misses (absent or expired)."
        );
        describe_counter!(
            "pactum_cache_l1_expired_total",
            Unit::Count,
            "Total number of volatile-tier entries evicted after their TTL passed."
        );
        describe_counter!(
            "pactum_cache_l2_hit_total",
            Unit::Count,
            "Total number of durable-tier lookups that backfilled the volatile tier."
        );
        describe_counter!(
            "pactum_cache_l2_miss_total",
            Unit::Count,
            "Total number of durable-tier lookups that found no usable record."
        );
        describe_counter!(
            "pactum_cache_l2_write_error_total",
            Unit::Count,
            "Total number of best-effort durable writes that failed and were absorbed."
        );
        describe_histogram!(
            "pactum_cache_l2_lookup_ms",
            Unit::Milliseconds,
            "Durable-tier lookup latency in milliseconds."
        );
    });
}
