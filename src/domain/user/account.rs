//! User account entity.

use std::fmt;

use crate::domain::foundation::{UserId, ValidationError, Version};
use crate::domain::optimistic_lock::Versioned;

/// Maximum length for a user name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length for an avatar reference.
pub const MAX_AVATAR_LENGTH: usize = 255;

/// A stored password hash. Never rendered, never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// User entity.
///
/// # Invariants
///
/// - `name` is 1-255 characters and unique across users (enforced by storage)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    password_hash: PasswordHash,
    avatar: String,
    version: Version,
}

impl User {
    /// Create a new user.
    pub fn new(
        id: UserId,
        name: String,
        password_hash: PasswordHash,
        avatar: String,
    ) -> Result<Self, ValidationError> {
        validate_name(&name)?;
        validate_avatar(&avatar)?;
        Ok(Self {
            id,
            name,
            password_hash,
            avatar,
            version: Version::INITIAL,
        })
    }

    /// Reconstitute a user from persistence (no validation).
    pub fn reconstitute(
        id: UserId,
        name: String,
        password_hash: PasswordHash,
        avatar: String,
        version: Version,
    ) -> Self {
        Self {
            id,
            name,
            password_hash,
            avatar,
            version,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn avatar(&self) -> &str {
        &self.avatar
    }

    /// Change the profile fields.
    pub fn update_profile(&mut self, name: String, avatar: String) -> Result<(), ValidationError> {
        validate_name(&name)?;
        validate_avatar(&avatar)?;
        self.name = name;
        self.avatar = avatar;
        Ok(())
    }

    pub fn set_password_hash(&mut self, hash: PasswordHash) {
        self.password_hash = hash;
    }
}

impl Versioned for User {
    const KIND: &'static str = "User";

    fn id_str(&self) -> &str {
        self.id.as_str()
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

/// Checks a user name without constructing a user.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::out_of_range("name", 1, MAX_NAME_LENGTH as i64, len as i64));
    }
    Ok(())
}

/// Checks an avatar reference without constructing a user.
pub fn validate_avatar(avatar: &str) -> Result<(), ValidationError> {
    let len = avatar.chars().count();
    if len > MAX_AVATAR_LENGTH {
        return Err(ValidationError::out_of_range(
            "avatar",
            0,
            MAX_AVATAR_LENGTH as i64,
            len as i64,
        ));
    }
    Ok(())
}
