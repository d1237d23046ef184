use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::internal::logger::{FormatterKind, Logger, LoggerError, Severity};

// Version information from build script - using option_env! for safety
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version information
pub fn get_version_info() -> String {
    let build_timestamp = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown");
    let build_date = option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown");
    let rustc_semver = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown");
    let cargo_target_triple = option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown");

    format!(
        "logcfg version {}\n\
         Built: {} ({})\n\
         Rust: {}\n\
         Target: {}",
        VERSION, build_date, build_timestamp, rustc_semver, cargo_target_triple
    )
}

/// Declarative logging configuration.
///
/// * `level`: TRACE, DEBUG, INFO, WARN, WARNING, ERROR, FATAL or PANIC in any
///   case. Empty keeps the current threshold.
/// * `format`: `text`, `json`, anything else selects the default formatter.
/// * `output`: `stdout`, `stderr`, anything else is a file path. Empty keeps
///   the current sink.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

impl LoggingConfig {
    /// The configuration every process starts from.
    pub fn bootstrap() -> Self {
        Self {
            level: "INFO".to_string(),
            format: String::new(),
            output: "stdout".to_string(),
        }
    }

    /// Load from `path` (or an optional `logging.*` in the working directory)
    /// and `LOGCFG_*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("level", "")?
            .set_default("format", "")?
            .set_default("output", "")?;

        let config_builder = match path {
            Some(path) => config_builder.add_source(File::with_name(path)),
            None => config_builder.add_source(File::with_name("logging").required(false)),
        };

        config_builder
            .add_source(Environment::with_prefix("LOGCFG"))
            .build()?
            .try_deserialize()
    }

    /// Apply level, then format, then output to `logger`.
    ///
    /// An invalid level returns before anything changes. An output that
    /// cannot be opened returns with the level and format already applied
    /// and the previous sink still active.
    ///
    /// An empty `output` is not opened as a path: it keeps the current sink,
    /// the same way an empty `level` keeps the threshold, so a config that
    /// only sets a level or format does not fail on output.
    pub fn init(&self, logger: &Logger) -> Result<(), LoggerError> {
        if !self.level.is_empty() {
            let level: Severity = self.level.parse()?;
            logger.set_level(level);
        }

        logger.set_formatter(FormatterKind::from_name(&self.format));

        if !self.output.is_empty() {
            logger.set_output(&self.output)?;
        }

        Ok(())
    }
}
