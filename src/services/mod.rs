//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod health;
pub mod products;
pub mod seo;

// Re-exports per facilitare l'import
pub use health::healthcheck;
pub use products::{get_product_by_slug, list_products};
pub use seo::{robots_txt, sitemap_xml};

use crate::core::AppError;
use axum::http::Uri;
use tracing::debug;

/// Fallback for unknown API paths, keeps them out of the SPA fallback
pub async fn api_not_found(uri: Uri) -> AppError {
    debug!("No API route for {}", uri);
    AppError::not_found("Not Found")
}
