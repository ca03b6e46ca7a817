//! Log initialisation with timestamps rendered in Korea Standard Time.
//!
//! Every log line carries a `YYYY-MM-DD HH:MM:SS` stamp shifted from UTC by a
//! fixed nine hours. The formatter is injectable so deployments in other
//! regions can swap it without touching the subscriber setup.

use crate::config::toml_config::{LogFormat, LoggingConfig};
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::fmt::format::{DefaultFields, Format, Full, Writer};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// UTC+9 in milliseconds.
pub const KST_OFFSET_MILLIS: i64 = 9 * 60 * 60 * 1000;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub type TimestampFormatter = Arc<dyn Fn(DateTime<Utc>) -> String + Send + Sync>;

/// Renders `instant` as KST wall-clock time without a zone suffix.
pub fn format_kst(instant: DateTime<Utc>) -> String {
    let shifted = instant + TimeDelta::milliseconds(KST_OFFSET_MILLIS);
    shifted.format(TIMESTAMP_FORMAT).to_string()
}

pub fn kst_timestamp() -> String {
    format_kst(Utc::now())
}

/// Timer for `tracing_subscriber` that delegates to an injected formatter.
#[derive(Clone)]
pub struct KstTimer {
    formatter: TimestampFormatter,
    clock: fn() -> DateTime<Utc>,
}

impl KstTimer {
    pub fn with_formatter<F>(formatter: F) -> Self
    where
        F: Fn(DateTime<Utc>) -> String + Send + Sync + 'static,
    {
        Self {
            formatter: Arc::new(formatter),
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn timestamp(&self) -> String {
        (self.formatter)((self.clock)())
    }
}

impl Default for KstTimer {
    fn default() -> Self {
        Self::with_formatter(format_kst)
    }
}

impl fmt::Debug for KstTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KstTimer").finish_non_exhaustive()
    }
}

impl FormatTime for KstTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", self.timestamp())
    }
}

/// The fmt layer every initialiser installs: KST timestamps, no target/thread/file noise.
pub(crate) fn fmt_layer<S>() -> Layer<S, DefaultFields, Format<Full, KstTimer>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_timer(KstTimer::default())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

fn default_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn install(filter: EnvFilter, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt_layer().json()).init(),
        LogFormat::Compact => registry.with(fmt_layer().compact()).init(),
    }
}

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        default_filter("retreat_notify=debug,info")
    } else {
        default_filter("retreat_notify=info")
    };
    install(filter, LogFormat::Compact);
}

/// JSON lines for log shipping, regardless of the `[logging]` section.
pub fn init_json_logger() {
    install(default_filter("retreat_notify=info"), LogFormat::Json);
}

/// Initialises logging from the `[logging]` section. The `verbose` flag wins
/// over the configured level.
pub fn init_logger(config: &LoggingConfig, verbose: bool) {
    if verbose {
        return init_cli_logger(true);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level()))
        .unwrap_or_else(|_| EnvFilter::new("retreat_notify=info"));
    install(filter, config.format());
}
