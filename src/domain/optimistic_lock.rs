//! Optimistic lock guard.
//!
//! Every update and delete presents the version the caller last saw. The
//! guard accepts the mutation only when that matches the stored version and
//! then advances the stored version by one. Storage adapters persist the
//! result with `WHERE version = <previous>` so a concurrent writer that
//! slipped in between still loses.

use thiserror::Error;

use super::foundation::{DomainError, ErrorCode, Version};

/// An entity protected by a version counter.
pub trait Versioned {
    /// Human-readable entity kind, used in error messages.
    const KIND: &'static str;

    /// Identifier rendered as a string.
    fn id_str(&self) -> &str;

    /// Currently stored version.
    fn version(&self) -> Version;

    /// Overwrites the version. Only the guard calls this.
    fn set_version(&mut self, version: Version);
}

/// A presented version did not match the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} {id} was modified concurrently (presented version {presented}, stored {stored})")]
pub struct VersionConflict {
    pub kind: &'static str,
    pub id: String,
    pub presented: Version,
    pub stored: Version,
}

impl From<VersionConflict> for DomainError {
    fn from(err: VersionConflict) -> Self {
        DomainError::new(ErrorCode::VersionConflict, err.to_string())
            .with_detail("id", err.id)
            .with_detail("presented", err.presented.to_string())
            .with_detail("stored", err.stored.to_string())
    }
}

/// Why [`acquire`] refused a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error(transparent)]
    Conflict(#[from] VersionConflict),

    /// The counter cannot advance any further.
    #[error("{kind} {id} has reached the maximum version")]
    Exhausted { kind: &'static str, id: String },
}

impl From<LockError> for DomainError {
    fn from(err: LockError) -> Self {
        let message = err.to_string();
        match err {
            LockError::Conflict(conflict) => conflict.into(),
            LockError::Exhausted { id, .. } => DomainError::new(ErrorCode::OutOfRange, message)
                .with_detail("field", "version")
                .with_detail("id", id),
        }
    }
}

/// Checks `presented` against the entity's stored version without touching it.
pub fn check<T: Versioned>(entity: &T, presented: Version) -> Result<(), VersionConflict> {
    if entity.version() != presented {
        return Err(VersionConflict {
            kind: T::KIND,
            id: entity.id_str().to_string(),
            presented,
            stored: entity.version(),
        });
    }
    Ok(())
}

/// Checks the version and, on success, advances it by one.
///
/// Returns the version the row holds in storage right now, which the
/// adapter must use as its write-time precondition. The entity is left
/// untouched on any error.
pub fn acquire<T: Versioned>(entity: &mut T, presented: Version) -> Result<Version, LockError> {
    check(entity, presented)?;
    let previous = entity.version();
    let next = previous.next().ok_or_else(|| LockError::Exhausted {
        kind: T::KIND,
        id: entity.id_str().to_string(),
    })?;
    entity.set_version(next);
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: String,
        version: Version,
        value: &'static str,
    }

    impl Versioned for Row {
        const KIND: &'static str = "Row";

        fn id_str(&self) -> &str {
            &self.id
        }

        fn version(&self) -> Version {
            self.version
        }

        fn set_version(&mut self, version: Version) {
            self.version = version;
        }
    }

    fn row(version: u32) -> Row {
        Row {
            id: "row_1".to_string(),
            version: Version::from_raw(version),
            value: "original",
        }
    }

    #[test]
    fn acquire_with_matching_version_bumps_by_one() {
        let mut r = row(4);
        let previous = acquire(&mut r, Version::from_raw(4)).unwrap();
        assert_eq!(previous, Version::from_raw(4));
        assert_eq!(r.version, Version::from_raw(5));
    }

    #[test]
    fn acquire_with_stale_version_leaves_entity_untouched() {
        let mut r = row(4);
        let before = r.clone();

        let err = acquire(&mut r, Version::from_raw(3)).unwrap_err();

        let conflict = match err {
            LockError::Conflict(conflict) => conflict,
            other => panic!("expected a conflict, got {:?}", other),
        };
        assert_eq!(conflict.presented, Version::from_raw(3));
        assert_eq!(conflict.stored, Version::from_raw(4));
        assert_eq!(r, before);
    }

    #[test]
    fn acquire_with_future_version_is_also_rejected() {
        let mut r = row(4);
        assert!(acquire(&mut r, Version::from_raw(5)).is_err());
    }

    #[test]
    fn repeated_rejection_is_identical() {
        let mut r = row(4);
        let first = acquire(&mut r, Version::from_raw(3)).unwrap_err();
        let second = acquire(&mut r, Version::from_raw(3)).unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn exhausted_version_is_refused_without_change() {
        let mut r = row(Version::MAX.as_u32());
        let before = r.clone();

        let err = acquire(&mut r, Version::MAX).unwrap_err();

        assert!(matches!(err, LockError::Exhausted { .. }));
        assert_eq!(r, before);
        let err: DomainError = err.into();
        assert_eq!(err.code, ErrorCode::OutOfRange);
        assert!(!err.code.is_conflict());
    }

    #[test]
    fn conflict_converts_to_version_conflict_code() {
        let err: DomainError = check(&row(2), Version::from_raw(1)).unwrap_err().into();
        assert_eq!(err.code, ErrorCode::VersionConflict);
        assert_eq!(err.details.get("stored"), Some(&"2".to_string()));
    }
}
