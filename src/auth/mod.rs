//! Identity tokens and password hashing.
//!
//! Tokens are stateless HS256 JWTs: verification depends only on the token
//! and the server secret, so any replica can check any token.

pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use password::{Argon2PasswordService, HashError, PasswordService};

/// Upper bound on the configurable token lifetime.
const MAX_EXPIRY_HOURS: i64 = 24 * 366;

/// Wire claims carried inside the JWT.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Identity recovered from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
}

/// A freshly signed token and its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("JWT generation error: {0}")]
    Signing(String),
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // A token is valid strictly before its expiry.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        let hours = i64::try_from(config.jwt_expiry_hours)
            .unwrap_or(MAX_EXPIRY_HOURS)
            .min(MAX_EXPIRY_HOURS);
        Self::new(&config.jwt_secret, Duration::hours(hours))
    }

    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl.num_seconds(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;

        let claims = data.claims;
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        let user_id = claims
            .sub
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or(TokenError::Malformed)?;

        Ok(Identity { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("unit-test-secret", Duration::hours(24))
    }

    #[test]
    fn issued_token_verifies_to_same_user() {
        let tokens = service();
        let issued = tokens.issue(42).unwrap();
        assert_eq!(issued.expires_in, 24 * 3600);

        let identity = tokens.verify(&issued.token).unwrap();
        assert_eq!(identity, Identity { user_id: 42 });
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert!(matches!(service().verify("invalidToken"), Err(TokenError::Malformed)));
        assert!(matches!(service().verify(""), Err(TokenError::Malformed)));
    }

    #[test]
    fn token_from_other_secret_has_bad_signature() {
        let foreign = TokenService::new("someone-elses-secret", Duration::hours(1))
            .issue(7)
            .unwrap();
        assert!(matches!(service().verify(&foreign.token), Err(TokenError::BadSignature)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let stale = TokenService::new("unit-test-secret", Duration::seconds(-30));
        let issued = stale.issue(7).unwrap();
        assert!(matches!(service().verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn non_numeric_subject_is_malformed() {
        let claims = Claims {
            sub: "alice".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::Malformed)));
    }
}
