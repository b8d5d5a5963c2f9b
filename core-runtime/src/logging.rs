//! # Logging
//!
//! `tracing` setup shared by every host.
//!
//! [`init_logging`] installs one `tracing-subscriber` stack:
//! - an `EnvFilter` built from [`LoggingConfig::directives`]
//! - a fmt layer in the configured [`LogFormat`]
//! - optionally a layer that mirrors events to a host [`LoggerSink`]
//!
//! Access tokens, authorization codes and PKCE verifiers must never reach a
//! log line. Code keeps them out of `tracing` fields in the first place (the
//! secret-bearing types have redacting `Debug` impls); entries forwarded to a
//! sink additionally pass through [`redact_if_sensitive`].
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! init_logging(LoggingConfig::default().with_format(LogFormat::Compact))?;
//! tracing::info!("Browser started");
//! ```

use crate::error::{Error, Result};
use bridge_traits::logger::{LogLevel, LoggerSink};
use std::str::FromStr;
use std::sync::Arc;

/// Crates logged at [`LoggingConfig::level`] when no custom filter is set.
const WORKSPACE_CRATES: &[&str] = &[
    "core_runtime",
    "core_auth",
    "core_service",
    "provider_dropbox",
    "bridge_desktop",
    "bridge_wasm",
];

/// Dependencies that are only interesting when something is wrong.
const QUIET_CRATES: &[&str] = &["h2", "hyper", "hyper_util", "reqwest", "rustls"];

const REDACTED: &str = "[REDACTED]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored
    Pretty,
    /// One JSON object per event
    Json,
    /// One line per event
    Compact,
}

impl Default for LogFormat {
    /// Pretty in debug builds, JSON in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(Error::Config(format!(
                "Unknown log format '{}'; expected pretty, json or compact",
                other
            ))),
        }
    }
}

#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level for the workspace crates; ignored when `filter` is set.
    pub level: LogLevel,
    /// Full `EnvFilter` directive string, e.g. `"core_auth=trace,info"`.
    pub filter: Option<String>,
    /// Redact credential fields before entries reach the sink.
    pub redact: bool,
    pub sink: Option<Arc<dyn LoggerSink>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            redact: true,
            sink: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_redaction(mut self, redact: bool) -> Self {
        self.redact = redact;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The `EnvFilter` directives this config stands for.
    pub fn directives(&self) -> String {
        if let Some(filter) = &self.filter {
            return filter.clone();
        }
        WORKSPACE_CRATES
            .iter()
            .map(|krate| format!("{}={}", krate, self.level))
            .chain(QUIET_CRATES.iter().map(|krate| format!("{}=warn", krate)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install the global subscriber. Only the first call in a process succeeds.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter, Layer};

    let filter = EnvFilter::try_new(config.directives())
        .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))?;

    let output = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    let sink = config
        .sink
        .map(|sink| sink_layer::SinkLayer::new(sink, config.redact));

    tracing_subscriber::registry()
        .with(output)
        .with(sink)
        .with(filter)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

/// Browsers have no stdout; hosts read the console through their own tooling.
#[cfg(target_arch = "wasm32")]
pub fn init_logging(_config: LoggingConfig) -> Result<()> {
    Ok(())
}

/// `value`, or `[REDACTED]` when `field` names a credential.
///
/// ```
/// use core_runtime::logging::redact_if_sensitive;
///
/// assert_eq!(redact_if_sensitive("code_verifier", "abc"), "[REDACTED]");
/// assert_eq!(redact_if_sensitive("path", "/notes.txt"), "/notes.txt");
/// ```
pub fn redact_if_sensitive(field: &str, value: &str) -> String {
    const CONTAINS: &[&str] = &[
        "token",
        "verifier",
        "challenge",
        "secret",
        "password",
        "authorization",
    ];
    // "code" alone; as a substring it would also hit "status_code".
    const EXACT: &[&str] = &["code", "auth_code"];

    let field = field.to_ascii_lowercase();
    if CONTAINS.iter().any(|needle| field.contains(needle)) || EXACT.contains(&field.as_str()) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod sink_layer {
    use super::redact_if_sensitive;
    use bridge_traits::logger::{LogEntry, LogLevel, LoggerSink};
    use std::fmt;
    use std::sync::Arc;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::Layer;

    pub(super) struct SinkLayer {
        sink: Arc<dyn LoggerSink>,
        redact: bool,
    }

    impl SinkLayer {
        pub(super) fn new(sink: Arc<dyn LoggerSink>, redact: bool) -> Self {
            Self { sink, redact }
        }
    }

    impl<S> Layer<S> for SinkLayer
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            let metadata = event.metadata();
            let level = to_log_level(metadata.level());
            if level < self.sink.min_level() {
                return;
            }

            let mut visitor = EntryVisitor {
                entry: LogEntry::new(level, metadata.target(), metadata.name()),
                redact: self.redact,
            };
            event.record(&mut visitor);
            let mut entry = visitor.entry;
            entry.span = ctx.event_span(event).map(|span| span.name().to_string());

            let sink = Arc::clone(&self.sink);
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if let Err(err) = sink.log(entry).await {
                            eprintln!("log sink failed: {}", err);
                        }
                    });
                }
                Err(_) => {
                    if let Err(err) = futures::executor::block_on(sink.log(entry)) {
                        eprintln!("log sink failed: {}", err);
                    }
                }
            }
        }
    }

    struct EntryVisitor {
        entry: LogEntry,
        redact: bool,
    }

    impl EntryVisitor {
        fn record(&mut self, field: &Field, value: String) {
            let name = field.name();
            if name == "message" {
                self.entry.message = value;
            } else if self.redact {
                let value = redact_if_sensitive(name, &value);
                self.entry.fields.insert(name.to_string(), value);
            } else {
                self.entry.fields.insert(name.to_string(), value);
            }
        }
    }

    impl Visit for EntryVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.record(field, value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.record(field, format!("{:?}", value));
        }
    }

    fn to_log_level(level: &Level) -> LogLevel {
        match *level {
            Level::TRACE => LogLevel::Trace,
            Level::DEBUG => LogLevel::Debug,
            Level::INFO => LogLevel::Info,
            Level::WARN => LogLevel::Warn,
            Level::ERROR => LogLevel::Error,
        }
    }

}
