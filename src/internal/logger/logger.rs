// src/internal/logger/logger.rs

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::{SubscriberInitExt, TryInitError},
};

use super::formatter::{ActiveFormatter, FormatterKind};
use super::severity::{ParseSeverityError, Severity, Threshold};
use super::sink::{ActiveSink, Sink, SinkKind};

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error(transparent)]
    Parse(#[from] ParseSeverityError),
    #[error("Failed to open log output {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Handle to the logging state: threshold, formatter and sink.
///
/// Clones share the same state. Every subscriber built from a handle reads
/// that state on each event, so changes apply to records emitted afterwards.
#[derive(Debug, Clone)]
pub struct Logger {
    threshold: Threshold,
    formatter: ActiveFormatter,
    sink: ActiveSink,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// A logger in the bootstrap state: INFO, default formatter, stdout.
    pub fn new() -> Self {
        Self {
            threshold: Threshold::new(Severity::Info),
            formatter: ActiveFormatter::new(FormatterKind::Default),
            sink: ActiveSink::new(Sink::Stdout),
        }
    }

    pub fn level(&self) -> Severity {
        self.threshold.get()
    }

    pub fn formatter(&self) -> FormatterKind {
        self.formatter.kind()
    }

    pub fn sink(&self) -> SinkKind {
        self.sink.kind()
    }

    pub fn set_level(&self, level: Severity) {
        self.threshold.set(level);
    }

    pub fn set_formatter(&self, kind: FormatterKind) {
        self.formatter.set(kind);
    }

    /// Resolve `output` and install it. On failure the current sink stays.
    pub fn set_output(&self, output: &str) -> Result<(), LoggerError> {
        let sink = Sink::open(output).map_err(|source| LoggerError::Io {
            path: PathBuf::from(output),
            source,
        })?;
        self.sink.replace(sink);
        Ok(())
    }

    /// Severity filter followed by a `fmt` layer bound to this handle.
    pub fn layer<S>(&self) -> impl Layer<S> + Send + Sync + 'static
    where
        S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    {
        self.threshold.clone().and_then(
            fmt::layer()
                .with_ansi(false)
                .event_format(self.formatter.clone())
                .with_writer(self.sink.clone()),
        )
    }

    /// A standalone subscriber, for scoped use with
    /// `tracing::subscriber::with_default`.
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + 'static {
        tracing_subscriber::registry().with(self.layer())
    }

    /// Install this handle as the process-wide default subscriber.
    pub fn install(&self) -> Result<(), TryInitError> {
        tracing_subscriber::registry().with(self.layer()).try_init()
    }
}

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// The process-wide logger, bootstrapped and installed on first use.
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(|| {
        let logger = Logger::new();
        if let Err(e) = logger.install() {
            eprintln!("Warning: a global subscriber is already installed, logcfg settings will not apply to it: {}", e);
        }
        logger
    })
}

// Convenience logging macros
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!($($arg)*)
    };
}

/// Log a fatal record, then exit the process with status 1.
#[macro_export]
macro_rules! log_fatal {
    ($($arg:tt)*) => {{
        tracing::error!(severity = "fatal", $($arg)*);
        ::std::process::exit(1)
    }};
}

/// Log a panic record, then panic with the same message.
/// Accepts `format!` arguments only.
#[macro_export]
macro_rules! log_panic {
    ($($arg:tt)*) => {{
        let message = ::std::format!($($arg)*);
        tracing::error!(severity = "panic", "{}", message);
        ::std::panic!("{}", message)
    }};
}
