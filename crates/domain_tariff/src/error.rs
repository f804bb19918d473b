//! Tariff domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};

/// Errors that can occur in the tariff domain
#[derive(Debug, Error)]
pub enum TariffError {
    #[error("Tariff not found: {0}")]
    TariffNotFound(String),

    #[error("Mapping not found: {0}")]
    MappingNotFound(String),

    #[error("Invalid tariff category '{0}'")]
    InvalidCategory(String),

    #[error("Invalid item type '{0}'")]
    InvalidItemType(String),

    #[error("Item {0} is already mapped")]
    AlreadyMapped(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl TariffError {
    pub fn validation(message: impl Into<String>) -> Self {
        TariffError::Validation(message.into())
    }
}
