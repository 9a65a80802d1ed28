//! Password hashing port.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::foundation::DomainError;
use crate::domain::user::PasswordHash;

/// Hashes and verifies user passwords.
///
/// Implementations are expected to be slow on purpose; callers must not
/// hold locks or open transactions while awaiting them.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &SecretString) -> Result<PasswordHash, DomainError>;

    /// Returns `Ok(false)` for a wrong password, `Err` only on malformed hashes.
    async fn verify(
        &self,
        password: &SecretString,
        hash: &PasswordHash,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hasher_is_object_safe() {
        fn _accepts_dyn(_hasher: &dyn PasswordHasher) {}
    }
}
