use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password digest is unreadable")]
    CorruptDigest,

    #[error("hashing task failed: {0}")]
    Task(String),
}

/// One-way password hashing.
///
/// Implementations must never log or persist the plaintext.
#[async_trait]
pub trait PasswordService: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// `Ok(false)` on mismatch; `Err` only when verification itself could not run.
    async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, HashError>;
}

/// Argon2id hashing on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct Argon2PasswordService {
    params: Params,
}

impl Argon2PasswordService {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| HashError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, HashError> {
        Self::new(config.hash_memory_kib, config.hash_iterations)
    }

    fn hasher(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }
}

#[async_trait]
impl PasswordService for Argon2PasswordService {
    async fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let params = self.params.clone();
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::hasher(params)
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| HashError::Hash(e.to_string()))
        })
        .await
        .map_err(|e| HashError::Task(e.to_string()))?
    }

    async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, HashError> {
        let params = self.params.clone();
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&digest).map_err(|_| HashError::CorruptDigest)?;
            // Cost parameters are read from the digest itself.
            match Self::hasher(params).verify_password(plaintext.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(HashError::Hash(e.to_string())),
            }
        })
        .await
        .map_err(|e| HashError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2PasswordService {
        Argon2PasswordService::new(1024, 1).unwrap()
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let passwords = cheap();
        let digest = passwords.hash("correct horse 1").await.unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(!digest.contains("correct horse 1"));
        assert!(passwords.verify("correct horse 1", &digest).await.unwrap());
        assert!(!passwords.verify("wrong horse 1", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_fresh_salt() {
        let passwords = cheap();
        let a = passwords.hash("password123").await.unwrap();
        let b = passwords.hash("password123").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn corrupt_digest_is_an_error_not_a_mismatch() {
        let result = cheap().verify("password123", "not-a-phc-string").await;
        assert!(matches!(result, Err(HashError::CorruptDigest)));
    }

    #[test]
    fn rejects_impossible_params() {
        assert!(matches!(Argon2PasswordService::new(1, 1), Err(HashError::Params(_))));
    }
}
