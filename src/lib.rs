//! Storefront library - espone i moduli principali per i test e per i binari

pub mod core;
pub mod db;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, config};

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use services::*;

    let mut router = Router::new()
        .nest("/api", configure_api_routes())
        .route("/robots.txt", get(robots_txt))
        .route("/sitemap.xml", get(sitemap_xml));

    let assets = &state.assets;
    if assets.images.is_dir() {
        debug!("Mounting '{}' for static files", assets.images.display());
        router = router.nest_service("/images", ServeDir::new(&assets.images));
    }
    if assets.public.is_dir() {
        debug!("Mounting '{}' for static files", assets.public.display());
        router = router.nest_service("/public", ServeDir::new(&assets.public));
    }

    // Tutto il resto va al front-end, index.html gestisce il routing lato client
    let spa = ServeDir::new(&assets.dist).fallback(ServeFile::new(assets.dist.join("index.html")));
    router = router
        .fallback_service(spa)
        .layer(TraceLayer::new_for_http());

    if state.is_development {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

/// Configura le routes JSON sotto /api
fn configure_api_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/products", get(list_products))
        .route("/products/{slug}", get(get_product_by_slug))
        .fallback(api_not_found)
}
