//! Coverage domain errors

use thiserror::Error;

use core_kernel::{CoreError, MoneyError, PortError};

/// Errors that can occur while evaluating coverage
#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("Insurance plan not found: {0}")]
    PlanNotFound(String),

    #[error("Insurance plan {0} is inactive")]
    PlanInactive(String),

    #[error("Invalid service category '{0}'")]
    InvalidCategory(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Port(#[from] PortError),
}
