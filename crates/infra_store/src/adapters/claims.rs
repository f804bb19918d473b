//! Claim, batch and batch history adapters

use async_trait::async_trait;
use tracing::{debug, instrument};

use core_kernel::{BatchId, ClaimId, PortError};
use domain_claims::{
    BatchCommit, BatchHistoryPort, BatchPort, BatchStatusChange, Claim, ClaimBatch, ClaimPort, ClaimStatus,
};

use crate::error::StoreError;
use crate::store::InMemoryStore;

#[async_trait]
impl ClaimPort for InMemoryStore {
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        self.read()
            .await
            .claims
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Claim", id).into())
    }

    #[instrument(skip(self, claim), fields(claim = %claim.claim_check_code, version = claim.version))]
    async fn save_claim(&self, claim: &Claim) -> Result<Claim, PortError> {
        let stored = self.write().await.put_claim(claim)?;
        debug!(version = stored.version, "Claim stored");
        Ok(stored)
    }

    async fn claims_in_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, PortError> {
        let mut claims: Vec<Claim> = self
            .read()
            .await
            .claims
            .values()
            .filter(|claim| claim.status == status)
            .cloned()
            .collect();
        claims.sort_by_key(|claim| claim.created_at);
        Ok(claims)
    }
}

#[async_trait]
impl BatchPort for InMemoryStore {
    async fn get_batch(&self, id: BatchId) -> Result<ClaimBatch, PortError> {
        self.read()
            .await
            .batches
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("ClaimBatch", id).into())
    }

    async fn latest_batch_number(&self, prefix: &str) -> Result<Option<String>, PortError> {
        Ok(self
            .read()
            .await
            .batch_numbers
            .keys()
            .filter(|number| number.starts_with(prefix))
            .max()
            .cloned())
    }

    async fn open_batches_containing(&self, claim_id: ClaimId) -> Result<Vec<ClaimBatch>, PortError> {
        Ok(self
            .read()
            .await
            .batches
            .values()
            .filter(|batch| batch.is_open() && batch.contains(claim_id))
            .cloned()
            .collect())
    }

    #[instrument(
        skip(self, commit),
        fields(batch = %commit.batch.batch_number, version = commit.batch.version, claims = commit.claims.len(), history = commit.history.len())
    )]
    async fn commit(&self, commit: BatchCommit) -> Result<ClaimBatch, PortError> {
        let batch = self.write().await.apply_commit(commit)?;
        debug!(status = %batch.status, "Batch commit applied");
        Ok(batch)
    }
}

#[async_trait]
impl BatchHistoryPort for InMemoryStore {
    async fn append(&self, change: &BatchStatusChange) -> Result<(), PortError> {
        self.write().await.history.push(change.clone());
        Ok(())
    }

    async fn history_for(&self, batch_id: BatchId) -> Result<Vec<BatchStatusChange>, PortError> {
        Ok(self
            .read()
            .await
            .history
            .iter()
            .filter(|change| change.batch_id == batch_id)
            .cloned()
            .collect())
    }
}
