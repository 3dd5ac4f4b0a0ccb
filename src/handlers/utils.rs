// handlers/utils.rs - Request extraction helpers shared by every tier

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::validation::{self, ValidationErrors};

/// Unwrap a JSON body. An oversized body is 413; a missing or unparseable one is 422.
pub fn read_json<T: DeserializeOwned>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::debug!("Rejected oversized request body: {}", rejection.body_text());
            Err(ApiError::payload_too_large("Request body is too large"))
        }
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(ValidationErrors::single("body", rejection.body_text()).into())
        }
    }
}

/// Parse a `:id` path segment, reporting anything but a positive integer as 422
///
/// Takes the raw extractor result so a segment that does not even decode
/// (e.g. `%FF`) gets the same JSON 422 as `abc`.
pub fn path_id(raw: Result<Path<String>, PathRejection>) -> Result<i64, ApiError> {
    match raw {
        Ok(Path(id)) => Ok(validation::entry_id(&id)?),
        Err(rejection) => {
            tracing::debug!("Rejected path segment: {}", rejection.body_text());
            Err(ValidationErrors::single("id", "id must be a positive integer").into())
        }
    }
}
