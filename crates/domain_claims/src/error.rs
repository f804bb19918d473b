//! Claims domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};
use domain_coverage::CoverageError;
use domain_tariff::TariffError;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Claim batch not found: {0}")]
    BatchNotFound(String),

    #[error("Claim item not found: {0}")]
    ItemNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Claim items can only be changed while the claim is draft or pending vetting (claim is {0})")]
    ClaimNotEditable(String),

    #[error("Item does not belong to this claim.")]
    ItemNotInClaim,

    #[error("G-DRG selection is required for NHIS claims.")]
    GdrgRequired,

    #[error("A rejection reason is required.")]
    RejectionReasonRequired,

    #[error("This batch has been finalized and cannot be modified.")]
    BatchNotModifiable,

    #[error("Only draft batches can be finalized.")]
    BatchNotDraft,

    #[error("Cannot finalize an empty batch.")]
    EmptyBatch,

    #[error("Only finalized batches can be marked as submitted.")]
    BatchNotFinalized,

    #[error("Can only record responses for submitted batches.")]
    BatchNotSubmitted,

    #[error("Claim {0} is not vetted. Only vetted claims can be added to a batch.")]
    ClaimNotVetted(String),

    #[error("Claim {0} is already in this batch.")]
    AlreadyInBatch(String),

    #[error("Claim is not in this batch.")]
    ClaimNotInBatch,

    #[error("Claim {0} was modified by someone else; reload and try again")]
    ConcurrentModification(String),

    #[error("Batch {0} was changed by another operation; reload and try again")]
    StaleBatch(String),

    #[error("Claim {0} is already in batch {1}.")]
    InOtherBatch(String, String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Coverage(#[from] CoverageError),

    #[error(transparent)]
    Tariff(#[from] TariffError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl ClaimError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status an outer surface should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ClaimNotFound(_) | Self::BatchNotFound(_) | Self::ItemNotFound(_) => 404,
            Self::ClaimNotEditable(_) | Self::ItemNotInClaim | Self::BatchNotModifiable => 403,
            Self::ConcurrentModification(_) | Self::StaleBatch(_) => 409,
            Self::Coverage(CoverageError::PlanNotFound(_)) => 404,
            Self::Tariff(TariffError::TariffNotFound(_) | TariffError::MappingNotFound(_)) => 404,
            Self::Port(err) if err.is_not_found() => 404,
            Self::Port(err) if err.is_conflict() || err.is_duplicate() => 409,
            Self::Port(PortError::Internal { .. }) => 500,
            _ => 422,
        }
    }

    /// Maps a stale-version rejection from storage to `ConcurrentModification`
    pub(crate) fn from_save(err: PortError, claim: &str) -> Self {
        if err.is_conflict() {
            Self::ConcurrentModification(claim.to_string())
        } else {
            err.into()
        }
    }

    /// Maps a version conflict on a batch commit to `StaleBatch`
    pub(crate) fn from_commit(err: PortError, batch_number: &str) -> Self {
        if err.is_conflict() {
            Self::StaleBatch(batch_number.to_string())
        } else {
            err.into()
        }
    }
}
