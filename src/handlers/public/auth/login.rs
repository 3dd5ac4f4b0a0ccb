// handlers/public/auth/login.rs - POST /api/v1/auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::handlers::utils::read_json;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::LoginRequest;

/// POST /api/v1/auth/login - Exchange credentials for a token
///
/// 404 when no account has the email, 401 when the password is wrong.
pub async fn login_post(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let request = read_json(body)?;
    let session = state.auth.login(request).await?;

    Ok(ApiResponse::success(json!({
        "token": session.token,
        "message": "Login Successful",
        "expires_in": session.expires_in,
    })))
}
