use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::handlers::utils::read_json;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::EntryRequest;

/// GET /api/v1/entries - All of the caller's entries, newest first
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let entries = state.entries.list(user.user_id).await?;
    Ok(ApiResponse::success(json!({ "entries": entries })))
}

/// POST /api/v1/entries - Create an entry owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<EntryRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let request = read_json(body)?;
    let entry = state.entries.create(user.user_id, request).await?;
    Ok(ApiResponse::created(json!({ "result": entry })))
}
