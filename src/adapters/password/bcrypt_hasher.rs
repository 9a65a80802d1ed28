//! bcrypt implementation of [`PasswordHasher`].
//!
//! Hashing runs on the blocking pool so a slow cost factor never stalls the
//! async runtime.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::PasswordHash;
use crate::ports::PasswordHasher;

/// bcrypt password hasher with a configurable cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

fn hashing_failed(cause: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::InternalError, format!("Password hashing failed: {}", cause))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &SecretString) -> Result<PasswordHash, DomainError> {
        let cost = self.cost;
        let password = password.expose_secret().clone();
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(hashing_failed)?
            .map_err(hashing_failed)?;
        Ok(PasswordHash::new(hashed))
    }

    async fn verify(
        &self,
        password: &SecretString,
        hash: &PasswordHash,
    ) -> Result<bool, DomainError> {
        let password = password.expose_secret().clone();
        let hash = hash.as_str().to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(hashing_failed)?
            .map_err(hashing_failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = BcryptPasswordHasher::new(4);
        let hash = hasher.hash(&secret("hunter2")).await.unwrap();

        assert!(hash.as_str().starts_with("$2"));
        assert!(hasher.verify(&secret("hunter2"), &hash).await.unwrap());
        assert!(!hasher.verify(&secret("hunter3"), &hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let hasher = BcryptPasswordHasher::new(4);
        let err = hasher
            .verify(&secret("x"), &PasswordHash::new("not-a-hash"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
