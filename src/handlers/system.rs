// handlers/system.rs - Unprefixed service info and health endpoints

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - Service name, version and route map
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "name": "Diary API",
        "version": version,
        "endpoints": {
            "health": "/health (public)",
            "auth": "/api/v1/auth/signup, /api/v1/auth/login (public - token acquisition)",
            "entries": "/api/v1/entries[/:id] (protected)",
            "account": "/api/v1/account/reminder (protected)",
        }
    }))
}

/// GET /health - 200 while the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.users.ping().await.map_err(|e| {
        tracing::warn!("Health check failed: {}", e);
        ApiError::service_unavailable("database unavailable")
    })?;

    Ok(Json(json!({
        "success": true,
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
