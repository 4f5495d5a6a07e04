//! Application State - Stato globale dell'applicazione
//!
//! Contiene i repository e le impostazioni condivise da tutte le route.

use super::config::Config;
use crate::db::DatabaseManager;
use crate::repositories::{ParameterRepository, ProductRepository};
use std::path::PathBuf;
use std::sync::Arc;

/// Locations of the files served outside the API
#[derive(Debug, Clone)]
pub struct StaticAssets {
    /// Front-end build output, with `index.html` as SPA entry point
    pub dist: PathBuf,
    pub images: PathBuf,
    pub public: PathBuf,
}

impl StaticAssets {
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            dist: root.join("dist"),
            images: root.join("images"),
            public: root.join("public"),
        }
    }
}

/// Stato globale dell'applicazione condiviso tra tutte le route
pub struct AppState {
    /// Repository per i prodotti
    pub products: ProductRepository,

    /// Repository per i parametri di configurazione
    pub parameters: ParameterRepository,

    /// Base URL pubblico usato per robots.txt e sitemap
    pub host_url: String,

    pub version: String,

    pub assets: StaticAssets,

    /// Abilita CORS permissivo per il front-end in sviluppo
    pub is_development: bool,
}

impl AppState {
    /// Crea una nuova istanza di AppState con un unico adapter condiviso
    ///
    /// # Arguments
    /// * `manager` - Adapter verso il database (già connesso)
    /// * `config` - Configurazione dell'applicazione
    pub fn new(manager: Arc<dyn DatabaseManager>, config: &Config) -> Self {
        Self {
            products: ProductRepository::new(manager.clone()),
            parameters: ParameterRepository::new(manager),
            host_url: config.host_url.clone(),
            version: config.version.clone(),
            assets: StaticAssets::under(&config.static_root),
            is_development: config.is_development,
        }
    }
}
