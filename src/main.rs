use std::sync::Arc;
use storefront::core::{AppState, Config, init_tracing};
use storefront::create_router;
use storefront::db::{RetryPolicy, RetryingManager, SupabaseManager};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Inizializza la configurazione
    let config = Config::from_env()?;
    init_tracing(&config);
    config.log_summary();

    // Connessione al database: fallisce subito se irraggiungibile o con chiave errata
    let supabase = SupabaseManager::connect(&config.database)
        .await
        .inspect_err(|e| error!("Cannot start without the database: {}", e))?;
    let manager = Arc::new(RetryingManager::new(supabase, RetryPolicy::default()));

    let state = Arc::new(AppState::new(manager, &config));
    let app = create_router(state);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    // Avvia il server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
