// handlers/public/auth/signup.rs - POST /api/v1/auth/signup handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::handlers::utils::read_json;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::SignupRequest;

/// POST /api/v1/auth/signup - Register an account and receive a token
///
/// Body: `{"full_name", "email", "password"}`. Responds 201 with
/// `{"token", "message", "expires_in"}`, 409 when the email is taken.
pub async fn signup_post(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let request = read_json(body)?;
    let session = state.auth.signup(request).await?;

    Ok(ApiResponse::created(json!({
        "token": session.token,
        "message": "Registration Successful",
        "expires_in": session.expires_in,
    })))
}
