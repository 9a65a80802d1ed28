//! User domain module.
//!
//! Users are the people tasks get assigned to. Their password hash stays
//! inside the domain and storage layers; nothing serializes it.

mod account;

pub use account::{
    validate_avatar, validate_name, PasswordHash, User, MAX_AVATAR_LENGTH, MAX_NAME_LENGTH,
};
