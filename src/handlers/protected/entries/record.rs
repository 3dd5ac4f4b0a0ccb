use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::handlers::utils::{path_id, read_json};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::EntryRequest;

/// GET /api/v1/entries/:id - One entry, 404 unless the caller owns it
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Value> {
    let id = path_id(id)?;
    let entry = state.entries.get(user.user_id, id).await?;
    Ok(ApiResponse::success(json!({ "entry": entry })))
}

/// PUT /api/v1/entries/:id - Replace title and body
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<EntryRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let id = path_id(id)?;
    let request = read_json(body)?;
    let entry = state.entries.update(user.user_id, id, request).await?;
    Ok(ApiResponse::success(json!({ "result": entry })))
}

/// DELETE /api/v1/entries/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Value> {
    let id = path_id(id)?;
    state.entries.delete(user.user_id, id).await?;
    Ok(ApiResponse::success(json!({ "message": "Diary entry deleted" })))
}
