//! Ports and Adapters Infrastructure
//!
//! Each domain crate defines async port traits for the data it needs
//! (tariffs, mappings, coverage rules, claims, batches). Storage adapters
//! implement them; services only ever see the traits.
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │            Application Services           │
//! │ (TariffService, CoverageService, ...)     │
//! └───────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌───────────────────────────────────────────┐
//! │               Port Traits                 │
//! │ (TariffPort, MappingPort, ClaimPort, ...) │
//! └───────────────────────────────────────────┘
//!                      ▲
//!                      │
//!           ┌──────────┴─────────┐
//!           │   Storage Adapter  │
//!           │    (infra_store)   │
//!           └────────────────────┘
//! ```
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait TariffPort: DomainPort {
//!     async fn get_tariff(&self, id: TariffId) -> Result<TariffEntry, PortError>;
//!     async fn save_tariff(&self, tariff: &TariffEntry) -> Result<(), PortError>;
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Every adapter reports failures through this type so that services can
/// handle storage errors uniformly.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// A unique index rejected the write
    #[error("Duplicate {entity_type}: {key} already exists")]
    Duplicate {
        entity_type: String,
        key: String,
    },

    /// The write was based on a stale version of the record
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Validation error with field information
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a Duplicate error
    pub fn duplicate(entity_type: impl Into<String>, key: impl fmt::Display) -> Self {
        PortError::Duplicate {
            entity_type: entity_type.into(),
            key: key.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, PortError::Duplicate { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so they can be shared across tasks.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = PortError::not_found("TariffEntry", "TRF-123");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("TariffEntry"));
        assert!(err.to_string().contains("TRF-123"));
    }

    #[test]
    fn test_duplicate_error() {
        let err = PortError::duplicate("ItemMapping", "drug:42");
        assert!(err.is_duplicate());
        assert!(!err.is_not_found());
    }
}
