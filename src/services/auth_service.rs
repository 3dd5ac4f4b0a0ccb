use std::sync::Arc;

use crate::auth::{PasswordService, TokenService};
use crate::database::models::NewUser;
use crate::database::{CredentialStore, DatabaseError};
use crate::validation::{self, LoginRequest, SignupRequest};

use super::ServiceError;

/// Token handed back by signup and login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub token: String,
    pub expires_in: i64,
}

/// Signup and login orchestration
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Register a new account and sign it in.
    ///
    /// Fails with `Conflict` when the email is already registered, including
    /// when a concurrent signup wins the race between lookup and insert.
    pub async fn signup(&self, request: SignupRequest) -> Result<Session, ServiceError> {
        let signup = validation::signup(request)?;

        if self.users.find_by_email(&signup.email).await?.is_some() {
            tracing::info!("Signup rejected: email already registered");
            return Err(ServiceError::Conflict("Email is already registered".to_string()));
        }

        let password_hash = self.passwords.hash(&signup.password).await?;

        let user = self
            .users
            .insert_user(NewUser {
                full_name: signup.full_name,
                email: signup.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => {
                    ServiceError::Conflict("Email is already registered".to_string())
                }
                other => other.into(),
            })?;

        let issued = self.tokens.issue(user.id)?;
        tracing::info!("Registered user {}", user.id);

        Ok(Session {
            user_id: user.id,
            token: issued.token,
            expires_in: issued.expires_in,
        })
    }

    /// Exchange credentials for a fresh token.
    ///
    /// Unknown email is `NotFound`, a wrong password is `Unauthorized`; the
    /// existence check always runs first.
    pub async fn login(&self, request: LoginRequest) -> Result<Session, ServiceError> {
        let credentials = validation::login(request)?;

        let user = self
            .users
            .find_by_email(&credentials.email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No account is registered with this email".to_string()))?;

        if !self
            .passwords
            .verify(&credentials.password, &user.password_hash)
            .await?
        {
            tracing::info!("Login rejected for user {}: wrong password", user.id);
            return Err(ServiceError::Unauthorized("Incorrect password".to_string()));
        }

        let issued = self.tokens.issue(user.id)?;
        tracing::debug!("User {} logged in", user.id);

        Ok(Session {
            user_id: user.id,
            token: issued.token,
            expires_in: issued.expires_in,
        })
    }
}
