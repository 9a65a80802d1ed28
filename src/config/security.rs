//! Password hashing configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Password hashing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// bcrypt work factor
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::within("security.bcrypt_cost", self.bcrypt_cost.into(), 4, 31)
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}
