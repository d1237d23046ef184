// src/internal/logger/severity.rs

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Name of the event field that lifts an `ERROR` event to fatal or panic.
pub const SEVERITY_FIELD: &str = "severity";

/// Severity of a log record, least to most important.
///
/// `tracing` stops at `ERROR`, so the two highest severities ride on
/// `ERROR`-level events carrying a `severity = "fatal" | "panic"` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
    Panic = 6,
}

impl Severity {
    pub const ALL: [Severity; 7] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
        Severity::Panic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
            Severity::Panic => "PANIC",
        }
    }

    /// Fatal and panic records get framed output.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Severity::Fatal | Severity::Panic)
    }

    fn from_u8(value: u8) -> Severity {
        Severity::ALL
            .get(value as usize)
            .copied()
            .unwrap_or(Severity::Panic)
    }

    /// Resolve the severity of an event, honouring the `severity` field on
    /// `ERROR` events.
    pub fn of_event(event: &Event<'_>) -> Severity {
        let base = Severity::from(*event.metadata().level());
        if base != Severity::Error || event.metadata().fields().field(SEVERITY_FIELD).is_none() {
            return base;
        }

        let mut visitor = SeverityVisitor::default();
        event.record(&mut visitor);
        match visitor.0 {
            Some(sev) if sev > Severity::Error => sev,
            _ => base,
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::TRACE => Severity::Trace,
            Level::DEBUG => Severity::Debug,
            Level::INFO => Severity::Info,
            Level::WARN => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a valid log level: {0:?}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            "panic" => Ok(Severity::Panic),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

#[derive(Default)]
struct SeverityVisitor(Option<Severity>);

impl Visit for SeverityVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == SEVERITY_FIELD {
            self.0 = value.parse().ok();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == SEVERITY_FIELD {
            let raw = format!("{:?}", value);
            self.0 = raw.trim_matches('"').parse().ok();
        }
    }
}

/// Shared severity threshold. Doubles as the filtering layer.
#[derive(Debug, Clone)]
pub struct Threshold(Arc<AtomicU8>);

impl Threshold {
    pub fn new(severity: Severity) -> Self {
        Self(Arc::new(AtomicU8::new(severity as u8)))
    }

    pub fn get(&self) -> Severity {
        Severity::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, severity: Severity) {
        self.0.store(severity as u8, Ordering::Release);
    }

    pub fn allows(&self, severity: Severity) -> bool {
        severity >= self.get()
    }
}

impl<S: Subscriber> Layer<S> for Threshold {
    fn event_enabled(&self, event: &Event<'_>, _ctx: Context<'_, S>) -> bool {
        self.allows(Severity::of_event(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_case() {
        assert_eq!("DEBUG".parse::<Severity>().unwrap(), Severity::Debug);
        assert_eq!("Info".parse::<Severity>().unwrap(), Severity::Info);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("fAtAl".parse::<Severity>().unwrap(), Severity::Fatal);
        assert_eq!("panic".parse::<Severity>().unwrap(), Severity::Panic);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "verbose".parse::<Severity>().unwrap_err();
        assert_eq!(err, ParseSeverityError("verbose".to_string()));
        assert!(err.to_string().contains("verbose"));
        assert!("".parse::<Severity>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for sev in Severity::ALL {
            assert_eq!(sev.to_string().parse::<Severity>().unwrap(), sev);
        }
    }

    #[test]
    fn ordering_puts_panic_on_top() {
        assert!(Severity::Trace < Severity::Debug);
        assert!(Severity::Error < Severity::Fatal);
        assert!(Severity::Fatal < Severity::Panic);
        assert!(Severity::Panic.is_terminal());
        assert!(!Severity::Error.is_terminal());
    }

    #[test]
    fn threshold_allows_at_and_above() {
        let threshold = Threshold::new(Severity::Info);
        assert!(!threshold.allows(Severity::Debug));
        assert!(threshold.allows(Severity::Info));
        assert!(threshold.allows(Severity::Panic));

        threshold.set(Severity::Fatal);
        assert_eq!(threshold.get(), Severity::Fatal);
        assert!(!threshold.allows(Severity::Error));
        assert!(threshold.allows(Severity::Fatal));
    }
}
