//! Health services - stato del server

use crate::core::AppState;
use axum::extract::{Json, State};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: String,
}

/// Liveness endpoint, does not touch the database
pub async fn healthcheck(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Storefront API is running.",
        version: state.version.clone(),
    })
}
