//! Strongly-typed identifier value objects.
//!
//! Identifiers are opaque strings. Generated IDs carry a kind prefix
//! (`task_`, `board_`, `user_`) followed by 32 hex digits; system boards
//! use fixed short IDs such as `todo`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

fn generate(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

fn non_empty(field: &'static str, id: String) -> Result<String, ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(id)
}

/// Unique identifier for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new random TaskId.
    pub fn generate() -> Self {
        Self(generate("task"))
    }

    /// Creates a TaskId from an existing string, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        non_empty("task_id", id.into()).map(Self)
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Unique identifier for a board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(String);

impl BoardId {
    /// Creates a new random BoardId.
    pub fn generate() -> Self {
        Self(generate("board"))
    }

    /// Creates a BoardId from an existing string, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        non_empty("board_id", id.into()).map(Self)
    }

    /// Fixed identifier used for system boards.
    pub(crate) fn system(id: &'static str) -> Self {
        Self(id.to_string())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BoardId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new random UserId.
    pub fn generate() -> Self {
        Self(generate("user"))
    }

    /// Creates a UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        non_empty("user_id", id.into()).map(Self)
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
