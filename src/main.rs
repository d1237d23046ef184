use logcfg::cli::{build_cli, parse_config, parse_severity};
use logcfg::{log_fatal, log_panic, Severity};
use tracing::{debug, error, info, trace, warn};

fn main() -> anyhow::Result<()> {
    // Bootstrap logging before anything else can emit
    let logger = logcfg::global();

    let matches = build_cli().get_matches();
    let config = match parse_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.init(logger) {
        error!("Failed to initialize logger: {}", e);
        std::process::exit(1);
    }
    debug!(
        level = %logger.level(),
        formatter = ?logger.formatter(),
        sink = ?logger.sink(),
        "Logging configured"
    );

    let message = matches
        .get_one::<String>("message")
        .map(|s| s.as_str())
        .unwrap_or_default();

    match parse_severity(&matches)? {
        Severity::Trace => trace!("{}", message),
        Severity::Debug => debug!("{}", message),
        Severity::Info => info!("{}", message),
        Severity::Warn => warn!("{}", message),
        Severity::Error => error!("{}", message),
        Severity::Fatal => log_fatal!("{}", message),
        Severity::Panic => log_panic!("{}", message),
    }

    Ok(())
}
