//! Optimistic-lock version counter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-entity version counter.
///
/// Starts at 1 on create and grows by exactly one on every accepted
/// mutation. Never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u32);

impl Version {
    /// Version assigned to freshly created entities.
    pub const INITIAL: Version = Version(1);

    /// Largest version a store can persist (a signed 32-bit column).
    pub const MAX: Version = Version(i32::MAX as u32);

    /// Wraps a raw value (from storage or a request).
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// The version that follows this one, or `None` once [`Version::MAX`]
    /// is reached.
    pub fn next(&self) -> Option<Self> {
        self.0
            .checked_add(1)
            .filter(|raw| *raw <= Self::MAX.0)
            .map(Self)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
