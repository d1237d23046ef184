use clap::{Arg, Command};
use crate::internal::config::LoggingConfig;
use crate::internal::logger::Severity;

pub fn build_cli() -> Command {
    // Leak the version string to get a 'static lifetime
    let version: &'static str = Box::leak(
        crate::internal::config::get_version_info().into_boxed_str()
    );

    Command::new("logcfg")
        .version(version)
        .about("Configure process logging and emit a message through it")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to a logging config file (default: ./logging.{toml,yaml,json})")
        )
        .arg(
            Arg::new("level")
                .long("level")
                .short('l')
                .help("Severity threshold (trace|debug|info|warn|error|fatal|panic)")
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Formatter (text|json|default)")
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output (stdout|stderr|<file path>)")
        )
        .arg(
            Arg::new("severity")
                .long("severity")
                .short('s')
                .value_parser(["trace", "debug", "info", "warn", "error", "fatal", "panic"])
                .default_value("info")
                .help("Severity of the emitted message")
        )
        .arg(
            Arg::new("message")
                .required(true)
                .help("Message to log")
        )
}

pub fn parse_config(matches: &clap::ArgMatches) -> anyhow::Result<LoggingConfig> {
    // A missing implicit file is fine, a broken one is an error
    let mut config = LoggingConfig::load(matches.get_one::<String>("config").map(|s| s.as_str()))?;

    // Override with CLI values
    if let Some(level) = matches.get_one::<String>("level") {
        config.level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("format") {
        config.format = format.clone();
    }
    if let Some(output) = matches.get_one::<String>("output") {
        config.output = output.clone();
    }

    Ok(config)
}

pub fn parse_severity(matches: &clap::ArgMatches) -> anyhow::Result<Severity> {
    let severity = matches
        .get_one::<String>("severity")
        .map(|s| s.as_str())
        .unwrap_or("info");
    Ok(severity.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config() {
        let matches = build_cli().get_matches_from([
            "logcfg", "--level", "DEBUG", "--format", "text", "--output", "stderr", "hello",
        ]);
        let config = parse_config(&matches).unwrap();
        assert_eq!(config.level, "DEBUG");
        assert_eq!(config.format, "text");
        assert_eq!(config.output, "stderr");
        assert_eq!(matches.get_one::<String>("message").unwrap(), "hello");
    }

    #[test]
    fn severity_defaults_to_info() {
        let matches = build_cli().get_matches_from(["logcfg", "hello"]);
        assert_eq!(parse_severity(&matches).unwrap(), Severity::Info);

        let matches = build_cli().get_matches_from(["logcfg", "-s", "fatal", "bye"]);
        assert_eq!(parse_severity(&matches).unwrap(), Severity::Fatal);
    }

    #[test]
    fn rejects_unknown_severity() {
        let result = build_cli().try_get_matches_from(["logcfg", "-s", "loud", "hello"]);
        assert!(result.is_err());
    }
}
