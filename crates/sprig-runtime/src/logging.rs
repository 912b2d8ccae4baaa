//! Subscriber setup driven by [`LoggingConfig`].
//!
//! Every dispatched event is served inside a `tick` span emitted by the root
//! scheduler at debug level. Turning on any of `span_events` also raises the
//! scheduler's target to debug, so `close = true` alone is enough to get one
//! timed line per tick without flooding the rest of the output.
//!
//! ```toml
//! [logging]
//! level = "info"
//! span_events = { close = true }
//! filters = { sprig_core = "debug" }
//! ```
//!
//! `RUST_LOG`, when set, replaces `level` as the base filter. The per-module
//! `filters` are added on top either way.

use std::ffi::OsStr;
use std::io;
use std::path::Path;

use tracing::warn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

/// Target of the per-event `tick` span.
pub const TICK_TARGET: &str = "sprig_core::service::scheduler";

/// Installs the global subscriber described by `config`.
///
/// Returns `false` without touching anything if a subscriber is already set.
pub fn init_from_config(config: &LoggingConfig) -> bool {
    try_init(config).is_ok()
}

/// Like [`init_from_config`], surfacing why installation failed.
pub fn try_init(config: &LoggingConfig) -> Result<(), TryInitError> {
    let (filter, rejected) = build_filter(config);

    let base = fmt::layer()
        .with_span_events(span_flags(&config.span_events))
        .with_thread_ids(config.thread_ids)
        .with_file(config.file_location)
        .with_line_number(config.file_location)
        .with_writer(make_writer(config));

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Full => base.boxed(),
        LogFormat::Pretty => base.pretty().boxed(),
        #[cfg(feature = "json-log")]
        LogFormat::Json => base.json().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()?;

    for directive in rejected {
        warn!(directive = %directive, "Ignored invalid log filter");
    }
    Ok(())
}

/// Filter directives derived from `config`, without the base level.
fn directives(config: &LoggingConfig) -> Vec<String> {
    let mut directives: Vec<String> = config
        .filters
        .iter()
        .map(|(module, level)| format!("{module}={level}"))
        .collect();

    if config.span_events.any() && !config.filters.contains_key(TICK_TARGET) {
        directives.push(format!("{TICK_TARGET}=debug"));
    }
    directives
}

/// Builds the filter and returns the directives that failed to parse.
fn build_filter(config: &LoggingConfig) -> (EnvFilter, Vec<String>) {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let mut rejected = Vec::new();
    for directive in directives(config) {
        match directive.parse() {
            Ok(parsed) => filter = filter.add_directive(parsed),
            Err(_) => rejected.push(directive),
        }
    }
    (filter, rejected)
}

fn span_flags(events: &SpanEventConfig) -> FmtSpan {
    [
        (events.new, FmtSpan::NEW),
        (events.enter, FmtSpan::ENTER),
        (events.exit, FmtSpan::EXIT),
        (events.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(on, _)| *on)
    .fold(FmtSpan::NONE, |acc, (_, flag)| acc | flag)
}

fn make_writer(config: &LoggingConfig) -> BoxMakeWriter {
    match (config.output, &config.file_path) {
        (LogOutput::Stdout, _) => BoxMakeWriter::new(io::stdout),
        (LogOutput::Stderr, _) => BoxMakeWriter::new(io::stderr),
        (LogOutput::File, Some(path)) => {
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path.file_name().unwrap_or_else(|| OsStr::new("sprig.log"));
            BoxMakeWriter::new(tracing_appender::rolling::never(dir, name))
        }
        // Rejected by validation; only reachable with a hand-built config.
        (LogOutput::File, None) => BoxMakeWriter::new(io::stdout),
    }
}
