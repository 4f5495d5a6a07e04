//! Config - configurazione dell'applicazione
//!
//! Loaded once at startup from the environment (and `.env`), then passed
//! explicitly to the components that need it.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in the environment or .env file")]
    Missing(&'static str),

    #[error("invalid {key} '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Output layout of the log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err("expected one of full, compact, pretty"),
        }
    }
}

/// Connection settings for the REST database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub service_role_key: String,
    /// Upper bound for a single HTTP call to the database
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub version: String,
    pub host: String,
    pub port: u16,
    /// Public base URL, used in robots.txt and the sitemap
    pub host_url: String,
    pub is_development: bool,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Directory containing `dist/`, `images/` and `public/`
    pub static_root: PathBuf,
    pub database: DatabaseConfig,
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (environment, map, ...)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = var("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let service_role_key = var("SUPABASE_SERVICE_ROLE_KEY")
            .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;

        let request_timeout_secs = match var("DB_REQUEST_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "DB_REQUEST_TIMEOUT_SECS",
                    value: v.clone(),
                    reason: "must be a positive number of seconds",
                })?,
            None => 30,
        };

        let port = match var("PORT") {
            Some(v) => v.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: v.clone(),
                reason: "must be a number between 0-65535",
            })?,
            None => 8093,
        };

        let is_development = match var("IS_DEVELOPMENT") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid {
                key: "IS_DEVELOPMENT",
                value: v.clone(),
                reason: "must be true or false",
            })?,
            None => false,
        };

        let log_format = match var("LOG_FORMAT") {
            Some(v) => v.parse().map_err(|reason| ConfigError::Invalid {
                key: "LOG_FORMAT",
                value: v.clone(),
                reason,
            })?,
            None => LogFormat::default(),
        };

        Ok(Config {
            version: var("APP_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            host_url: var("HOST_URL")
                .unwrap_or_else(|| "http://localhost:8092".to_string())
                .trim_end_matches('/')
                .to_string(),
            is_development,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
            log_format,
            static_root: var("STATIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            database: DatabaseConfig {
                url,
                service_role_key,
                request_timeout: Duration::from_secs(request_timeout_secs),
            },
        })
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn log_summary(&self) {
        info!(
            version = %self.version,
            address = %format!("{}:{}", self.host, self.port),
            host_url = %self.host_url,
            development = self.is_development,
            static_root = %self.static_root.display(),
            database = %self.database.url,
            service_role_key = %mask_secret(&self.database.service_role_key),
            "Server configuration"
        );
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Maschera un segreto per il logging, lasciando visibili gli ultimi 4 caratteri
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}
