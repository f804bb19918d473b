//! Claims Domain Ports

use async_trait::async_trait;

use core_kernel::{BatchId, ClaimId, DomainPort, PortError};

use crate::batch::ClaimBatch;
use crate::claim::{Claim, ClaimStatus};
use crate::history::BatchStatusChange;

/// Port for claims
#[async_trait]
pub trait ClaimPort: DomainPort {
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// Stores a claim and returns it at its new version
    ///
    /// `claim.version` must equal the stored version (zero for a new claim).
    /// Adapters reject a stale version with [`PortError::Conflict`].
    async fn save_claim(&self, claim: &Claim) -> Result<Claim, PortError>;

    async fn claims_in_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, PortError>;
}

/// Everything one batch operation changes
///
/// Applied all-or-nothing: batch and claim versions are checked before
/// anything is written, and the history rows go to the append-only log.
#[derive(Debug, Clone)]
pub struct BatchCommit {
    pub batch: ClaimBatch,
    pub claims: Vec<Claim>,
    pub history: Vec<BatchStatusChange>,
}

impl BatchCommit {
    pub fn batch(batch: ClaimBatch) -> Self {
        Self { batch, claims: Vec::new(), history: Vec::new() }
    }

    pub fn with_claims(mut self, claims: Vec<Claim>) -> Self {
        self.claims = claims;
        self
    }

    pub fn with_history(mut self, history: impl IntoIterator<Item = BatchStatusChange>) -> Self {
        self.history.extend(history);
        self
    }
}

/// Port for claim batches
#[async_trait]
pub trait BatchPort: DomainPort {
    async fn get_batch(&self, id: BatchId) -> Result<ClaimBatch, PortError>;

    /// Highest batch number starting with `prefix`
    async fn latest_batch_number(&self, prefix: &str) -> Result<Option<String>, PortError>;

    /// Draft or finalized batches that list the claim
    async fn open_batches_containing(&self, claim_id: ClaimId) -> Result<Vec<ClaimBatch>, PortError>;

    /// Applies a [`BatchCommit`] atomically and returns the stored batch
    ///
    /// `commit.batch.version` must equal the stored version (zero for a new
    /// batch); adapters reject a stale batch with [`PortError::Conflict`].
    async fn commit(&self, commit: BatchCommit) -> Result<ClaimBatch, PortError>;
}

/// Port for the batch status log
///
/// Rows can only be appended and read.
#[async_trait]
pub trait BatchHistoryPort: DomainPort {
    async fn append(&self, change: &BatchStatusChange) -> Result<(), PortError>;

    /// Every row for a batch, oldest first
    async fn history_for(&self, batch_id: BatchId) -> Result<Vec<BatchStatusChange>, PortError>;
}
