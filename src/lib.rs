pub mod cli;
pub mod internal;

// Re-export commonly used types
pub use internal::config::config;
pub use internal::config::LoggingConfig;
pub use internal::logger::{
    global, DefaultLogFormatter, FormatterKind, LogRecord, Logger, LoggerError, Severity,
    SinkKind,
};
