// src/internal/config/mod.rs

#[path = "_config.rs"]
pub mod config;

pub use config::{get_version_info, LoggingConfig, VERSION};
