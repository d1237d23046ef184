// src/internal/logger/formatter.rs

use std::fmt::{self, Write as _};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{self, Format, FormatEvent, FormatFields, Full, Json, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

use super::severity::{Severity, SEVERITY_FIELD};

/// Which formatter renders records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterKind {
    /// Human readable text with timestamp, level, target and fields.
    Text,
    /// One JSON object per record.
    Json,
    /// [`DefaultLogFormatter`].
    #[default]
    Default,
}

impl FormatterKind {
    /// Maps a configured format name. Unknown names select the default formatter.
    pub fn from_name(name: &str) -> Self {
        match name {
            "text" => FormatterKind::Text,
            "json" => FormatterKind::Json,
            _ => FormatterKind::Default,
        }
    }
}

/// A log record as seen by [`DefaultLogFormatter`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            target: String::new(),
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn from_event(event: &Event<'_>) -> Self {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        Self {
            timestamp: Utc::now(),
            severity: Severity::of_event(event),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        }
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            SEVERITY_FIELD => {}
            name => self.fields.push((name.to_string(), value.to_string())),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            SEVERITY_FIELD => {}
            name => self.fields.push((name.to_string(), format!("{:?}", value))),
        }
    }
}

/// Fallback formatter: one line per record, with fatal and panic records
/// framed so they stand out in captured output.
///
/// ```text
/// 2026-10-19T08:00:00.000Z INFO listening port=8080
/// *** PANIC ***
/// 2026-10-19T08:00:01.000Z PANIC lost the socket
/// *** end PANIC ***
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLogFormatter;

impl DefaultLogFormatter {
    /// Render a record. Never fails for a well-formed record.
    pub fn format(&self, record: &LogRecord) -> Result<Vec<u8>, fmt::Error> {
        let mut out = String::new();
        self.render(record, &mut out)?;
        Ok(out.into_bytes())
    }

    fn render(&self, record: &LogRecord, out: &mut impl fmt::Write) -> fmt::Result {
        let terminal = record.severity.is_terminal();
        if terminal {
            writeln!(out, "*** {} ***", record.severity)?;
        }

        write!(
            out,
            "{} {} {}",
            record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            record.severity,
            record.message
        )?;
        for (key, value) in &record.fields {
            write!(out, " {}={}", key, value)?;
        }
        out.write_char('\n')?;

        if terminal {
            writeln!(out, "*** end {} ***", record.severity)?;
        }
        Ok(())
    }
}

impl<S, N> FormatEvent<S, N> for DefaultLogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        self.render(&LogRecord::from_event(event), &mut writer)
    }
}

/// The formatter installed in the `fmt` layer. Dispatches every event to the
/// currently selected [`FormatterKind`].
#[derive(Debug, Clone)]
pub struct ActiveFormatter {
    kind: Arc<RwLock<FormatterKind>>,
    text: Format<Full>,
    json: Format<Json>,
    fallback: DefaultLogFormatter,
}

impl ActiveFormatter {
    pub fn new(kind: FormatterKind) -> Self {
        Self {
            kind: Arc::new(RwLock::new(kind)),
            text: format::format(),
            // span fields are stored by `DefaultFields`, not as JSON
            json: format::format()
                .json()
                .with_current_span(false)
                .with_span_list(false),
            fallback: DefaultLogFormatter,
        }
    }

    pub fn kind(&self) -> FormatterKind {
        *self.kind.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, kind: FormatterKind) {
        *self.kind.write().unwrap_or_else(PoisonError::into_inner) = kind;
    }
}

impl<S, N> FormatEvent<S, N> for ActiveFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        match self.kind() {
            FormatterKind::Text => self.text.format_event(ctx, writer, event),
            FormatterKind::Json => self.json.format_event(ctx, writer, event),
            FormatterKind::Default => self.fallback.format_event(ctx, writer, event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(severity: Severity, message: &str) -> LogRecord {
        LogRecord {
            timestamp: Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap(),
            severity,
            target: "logcfg".to_string(),
            message: message.to_string(),
            fields: Vec::new(),
        }
    }

    fn render(record: &LogRecord) -> String {
        String::from_utf8(DefaultLogFormatter.format(record).unwrap()).unwrap()
    }

    #[test]
    fn formatter_names() {
        assert_eq!(FormatterKind::from_name("text"), FormatterKind::Text);
        assert_eq!(FormatterKind::from_name("json"), FormatterKind::Json);
        assert_eq!(FormatterKind::from_name(""), FormatterKind::Default);
        assert_eq!(FormatterKind::from_name("logfmt"), FormatterKind::Default);
        assert_eq!(FormatterKind::from_name("TEXT"), FormatterKind::Default);
    }

    #[test]
    fn renders_single_line() {
        let line = render(&record(Severity::Info, "something").with_field("port", "8080"));
        assert_eq!(line, "2026-10-19T08:00:00.000Z INFO something port=8080\n");
    }

    #[test]
    fn empty_message_is_not_an_error() {
        let rec = record(Severity::Info, "");
        assert!(DefaultLogFormatter.format(&rec).is_ok());
        assert_eq!(render(&rec), "2026-10-19T08:00:00.000Z INFO \n");
    }

    #[test]
    fn frames_fatal_and_panic() {
        assert_eq!(
            render(&record(Severity::Panic, "Panic Test")),
            "*** PANIC ***\n2026-10-19T08:00:00.000Z PANIC Panic Test\n*** end PANIC ***\n"
        );

        let fatal = render(&record(Severity::Fatal, "gone"));
        assert!(fatal.starts_with("*** FATAL ***\n"));
        assert!(fatal.ends_with("*** end FATAL ***\n"));

        assert!(!render(&record(Severity::Error, "bad")).contains("***"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let rec = record(Severity::Fatal, "same input");
        assert_eq!(render(&rec), render(&rec));
    }

    #[test]
    fn active_formatter_switches_kind() {
        let active = ActiveFormatter::new(FormatterKind::Default);
        let shared = active.clone();
        shared.set(FormatterKind::Json);
        assert_eq!(active.kind(), FormatterKind::Json);
    }
}
