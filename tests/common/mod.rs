#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use storefront::core::{AppState, Config};
use storefront::db::{DatabaseManager, MemoryManager};

/// Configurazione di test, senza file `.env`
///
/// # Arguments
/// * `static_root` - directory con `dist/`, `images/`, `public/`
pub fn test_config(static_root: &str) -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SUPABASE_URL", "http://127.0.0.1:9"),
        ("SUPABASE_SERVICE_ROLE_KEY", "test-service-role-key"),
        ("HOST_URL", "https://shop.example.org"),
        ("APP_VERSION", "9.9.9"),
        ("STATIC_ROOT", static_root),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("Failed to build test config")
}

/// Backend in memoria con gli stessi vincoli di unicità del database
pub fn memory_manager() -> Arc<MemoryManager> {
    Arc::new(MemoryManager::new().with_unique("products", "slug"))
}

/// Inserisce tre prodotti di esempio (ids 1, 2, 3)
pub async fn seed_products(manager: &MemoryManager) {
    for (title, slug) in [
        ("Divorce Petition", "divorce-petition"),
        ("Court Filing", "court-filing"),
        ("Small Claims", "small-claims"),
    ] {
        manager
            .insert(
                "products",
                &json!({
                    "title": title,
                    "description": format!("# {title}"),
                    "order_link": format!("https://forms.example.org/{slug}"),
                    "image_path": format!("/images/{slug}.webp"),
                    "icon": "fa-gavel",
                    "slug": slug,
                }),
            )
            .await
            .expect("Failed to seed product");
    }
}

/// Crea un AppState per i test
pub fn create_test_state(manager: Arc<dyn DatabaseManager>, static_root: &str) -> Arc<AppState> {
    Arc::new(AppState::new(manager, &test_config(static_root)))
}

/// Crea un TestServer per i test
///
/// # Arguments
/// * `state` - AppState da utilizzare per il server
///
/// # Returns
/// TestServer configurato e pronto per eseguire richieste
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = storefront::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}
