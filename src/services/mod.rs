pub mod account_service;
pub mod auth_service;
pub mod entry_service;
pub mod push_gateway;
pub mod reminder_service;

use thiserror::Error;

use crate::auth::{HashError, TokenError};
use crate::database::DatabaseError;
use crate::validation::ValidationErrors;

pub use account_service::{AccountService, ReminderStatus};
pub use auth_service::{AuthService, Session};
pub use entry_service::EntryService;
pub use push_gateway::{gateway_from_config, HttpPushGateway, LogPushGateway, PushError, PushGateway};
pub use reminder_service::{DispatchSummary, ReminderService};

/// Failures a service can report, before they are mapped onto HTTP
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Token(#[from] TokenError),
}
