use maxim_core::config::{AppConfig, LogFormat};
use tracing::Level;

/// Installs a stderr subscriber so stdout stays a single JSON document. Returns
/// `false` when a global subscriber is already set.
pub fn init_logging(config: &AppConfig) -> bool {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let result = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.is_ok()
}
