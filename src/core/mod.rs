//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Configurazione
//! - Gestione errori HTTP
//! - Logging
//! - Stato applicazione

pub mod config;
pub mod error;
pub mod logging;
pub mod state;

// Re-exports per facilitare l'import
pub use config::{Config, ConfigError, DatabaseConfig, LogFormat};
pub use error::AppError;
pub use logging::init_tracing;
pub use state::{AppState, StaticAssets};
