// src/internal/logger/mod.rs

pub mod formatter;
pub mod logger;
pub mod severity;
pub mod sink;

pub use formatter::{DefaultLogFormatter, FormatterKind, LogRecord};
pub use logger::{global, Logger, LoggerError};
pub use severity::{ParseSeverityError, Severity};
pub use sink::SinkKind;

// The log_* macros are exported at the crate root via #[macro_export].
