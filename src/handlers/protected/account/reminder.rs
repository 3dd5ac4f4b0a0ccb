use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::handlers::utils::read_json;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ReminderStatus;
use crate::validation::ReminderRequest;

/// GET /api/v1/account/reminder - Current reminder preference
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<ReminderStatus> {
    let status = state.accounts.reminder_settings(user.user_id).await?;
    Ok(ApiResponse::success(status))
}

/// PUT /api/v1/account/reminder - Opt in or out of the daily reminder
///
/// Opting in requires `subscription`, the browser's push subscription JSON.
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<ReminderRequest>, JsonRejection>,
) -> ApiResult<ReminderStatus> {
    let request = read_json(body)?;
    let status = state.accounts.update_reminder(user.user_id, request).await?;
    Ok(ApiResponse::success(status))
}
