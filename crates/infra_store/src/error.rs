//! Storage error types

use thiserror::Error;

use core_kernel::PortError;

/// Errors raised by the store itself, before they cross a port boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Unique index violation
    #[error("{entity} with {field} '{value}' already exists")]
    DuplicateEntry {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Optimistic version check failed
    #[error("{entity} '{id}' was saved at version {expected} but the store holds version {found}")]
    VersionConflict {
        entity: &'static str,
        id: String,
        expected: u64,
        found: u64,
    },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound { entity, id: id.to_string() }
    }

    pub fn duplicate(entity: &'static str, field: &'static str, value: impl std::fmt::Display) -> Self {
        StoreError::DuplicateEntry {
            entity,
            field,
            value: value.to_string(),
        }
    }

    pub fn stale(entity: &'static str, id: impl std::fmt::Display, expected: u64, found: u64) -> Self {
        StoreError::VersionConflict {
            entity,
            id: id.to_string(),
            expected,
            found,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::DuplicateEntry { .. })
    }
}

/// Translates store errors for the domain:
/// - `NotFound` -> `PortError::NotFound`
/// - `DuplicateEntry` -> `PortError::Duplicate`
/// - `VersionConflict` -> `PortError::Conflict`
impl From<StoreError> for PortError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => PortError::not_found(entity, id),
            StoreError::DuplicateEntry { entity, value, .. } => PortError::duplicate(entity, value),
            conflict @ StoreError::VersionConflict { .. } => PortError::conflict(conflict.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_the_plain_id() {
        let err: PortError = StoreError::not_found("Claim", "CLM-1").into();
        assert!(matches!(err, PortError::NotFound { ref id, .. } if id == "CLM-1"));
    }

    #[test]
    fn test_duplicate_and_conflict_translation() {
        let err: PortError = StoreError::duplicate("TariffEntry", "code", "AMOXYCAP1").into();
        assert!(err.is_duplicate());
        assert!(err.to_string().contains("AMOXYCAP1"));

        let err: PortError = StoreError::stale("Claim", "CCC-1", 2, 3).into();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("version 2"));
    }

    #[test]
    fn test_classification() {
        assert!(StoreError::not_found("Claim", "x").is_not_found());
        assert!(StoreError::duplicate("Claim", "code", "x").is_constraint_violation());
        assert!(!StoreError::stale("Claim", "x", 1, 2).is_constraint_violation());
    }
}
