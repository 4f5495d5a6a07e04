//! Logging - inizializzazione di tracing
//!
//! `RUST_LOG` takes precedence over the configured `LOG_LEVEL`.

use super::config::{Config, LogFormat};
use tracing::warn;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Parses a log level name, case insensitive
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse::<LevelFilter>().ok()
}

/// Installs the global subscriber; a second call is a no-op
pub fn init_tracing(config: &Config) {
    let level = parse_level(&config.log_level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(LevelFilter::INFO).to_string()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.log_format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    if installed.is_ok() && level.is_none() {
        warn!(
            "Invalid LOG_LEVEL '{}', falling back to 'info'",
            config.log_level
        );
    }
}
