//! Batch service
//!
//! Every operation loads the batch, changes it in memory and hands the
//! batch, any claims it touched and its new history rows to
//! [`BatchPort::commit`] in one go. Totals are recomputed from the batch
//! items after each change.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{BatchId, ClaimId, Currency, Money, PortError};

use crate::batch::{batch_number_prefix, next_batch_number, BatchItemStatus, ClaimBatch, ClaimResponse};
use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;
use crate::history::BatchStatusChange;
use crate::ports::{BatchCommit, BatchHistoryPort, BatchPort, ClaimPort};
use crate::services::load_claim;

/// Outcome of adding several claims to a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAddResult {
    pub added: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Outcome of recording payer responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseResult {
    pub processed: usize,
    pub errors: Vec<String>,
}

/// Payment reported by the payer for a whole batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchPayment {
    pub paid_at: DateTime<Utc>,
    pub paid_amount: Option<Money>,
}

#[derive(Clone)]
pub struct BatchService {
    batches: Arc<dyn BatchPort>,
    history: Arc<dyn BatchHistoryPort>,
    claims: Arc<dyn ClaimPort>,
    currency: Currency,
}

impl BatchService {
    pub fn new(batches: Arc<dyn BatchPort>, history: Arc<dyn BatchHistoryPort>, claims: Arc<dyn ClaimPort>) -> Self {
        Self {
            batches,
            history,
            claims,
            currency: Currency::GHS,
        }
    }

    /// Opens a draft batch numbered `BATCH-YYYYMM-NNNN` for the current month
    #[instrument(skip(self, notes))]
    pub async fn create_batch(
        &self,
        name: &str,
        submission_period: NaiveDate,
        actor: &str,
        notes: Option<String>,
    ) -> Result<ClaimBatch, ClaimError> {
        let prefix = batch_number_prefix(Utc::now());
        let latest = self.batches.latest_batch_number(&prefix).await?;
        let number = next_batch_number(&prefix, latest.as_deref());

        let (batch, created) = ClaimBatch::create(number.clone(), name, submission_period, actor, notes, self.currency);
        let batch = self
            .batches
            .commit(BatchCommit::batch(batch).with_history([created]))
            .await
            .map_err(|err| ClaimError::from_commit(err, &number))?;

        info!(batch = %batch.batch_number, "Claim batch created");
        Ok(batch)
    }

    pub async fn batch(&self, id: BatchId) -> Result<ClaimBatch, ClaimError> {
        self.batches.get_batch(id).await.map_err(|err| match err {
            PortError::NotFound { id, .. } => ClaimError::BatchNotFound(id),
            other => other.into(),
        })
    }

    pub async fn history(&self, id: BatchId) -> Result<Vec<BatchStatusChange>, ClaimError> {
        Ok(self.history.history_for(id).await?)
    }

    /// Adds vetted claims to a draft batch
    ///
    /// Best effort: unknown claims, claims that are not vetted, claims
    /// already in the batch and claims waiting in another open batch are
    /// skipped with a message each, the rest are added.
    #[instrument(skip(self, claim_ids), fields(requested = claim_ids.len()))]
    pub async fn add_claims(&self, batch_id: BatchId, claim_ids: &[ClaimId]) -> Result<BatchAddResult, ClaimError> {
        let mut batch = self.batch(batch_id).await?;
        batch.ensure_modifiable()?;

        let mut result = BatchAddResult::default();
        for &claim_id in claim_ids {
            let claim = match self.claims.get_claim(claim_id).await {
                Ok(claim) => claim,
                Err(err) if err.is_not_found() => {
                    result.errors.push(format!("Claim ID {} not found.", claim_id));
                    result.skipped += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let elsewhere = self
                .batches
                .open_batches_containing(claim_id)
                .await?
                .into_iter()
                .find(|other| other.id != batch.id);
            if let Some(other) = elsewhere {
                result
                    .errors
                    .push(ClaimError::InOtherBatch(claim.claim_check_code, other.batch_number).to_string());
                result.skipped += 1;
                continue;
            }

            match batch.add_claim(&claim) {
                Ok(()) => result.added += 1,
                Err(err @ (ClaimError::ClaimNotVetted(_) | ClaimError::AlreadyInBatch(_))) => {
                    result.errors.push(err.to_string());
                    result.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        batch.recalculate_totals()?;
        let number = batch.batch_number.clone();
        let batch = self
            .batches
            .commit(BatchCommit::batch(batch))
            .await
            .map_err(|err| ClaimError::from_commit(err, &number))?;

        info!(
            batch = %batch.batch_number,
            added = result.added,
            skipped = result.skipped,
            total = %batch.total_amount,
            "Claims added to batch"
        );
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn remove_claim(&self, batch_id: BatchId, claim_id: ClaimId) -> Result<ClaimBatch, ClaimError> {
        let mut batch = self.batch(batch_id).await?;
        batch.remove_claim(claim_id)?;
        let number = batch.batch_number.clone();
        self.batches
            .commit(BatchCommit::batch(batch))
            .await
            .map_err(|err| ClaimError::from_commit(err, &number))
    }

    #[instrument(skip(self))]
    pub async fn finalize(&self, batch_id: BatchId, actor: &str) -> Result<ClaimBatch, ClaimError> {
        let mut batch = self.batch(batch_id).await?;
        let change = batch.finalize(actor)?;
        let number = batch.batch_number.clone();
        let batch = self
            .batches
            .commit(BatchCommit::batch(batch).with_history([change]))
            .await
            .map_err(|err| ClaimError::from_commit(err, &number))?;
        info!(batch = %batch.batch_number, claims = batch.total_claims, "Batch finalized");
        Ok(batch)
    }

    /// Marks a finalized batch as sent and every claim in it as submitted
    #[instrument(skip(self))]
    pub async fn mark_submitted(
        &self,
        batch_id: BatchId,
        actor: &str,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Result<ClaimBatch, ClaimError> {
        let mut batch = self.batch(batch_id).await?;
        let submitted_at = submitted_at.unwrap_or_else(Utc::now);
        let change = batch.mark_submitted(actor, submitted_at)?;

        let mut claims = Vec::with_capacity(batch.items.len());
        for claim_id in batch.claim_ids() {
            let mut claim = load_claim(self.claims.as_ref(), claim_id).await?;
            claim.submit(actor, submitted_at.date_naive(), Some(batch.batch_number.clone()))?;
            claims.push(claim);
        }

        let number = batch.batch_number.clone();
        let batch = self
            .batches
            .commit(BatchCommit::batch(batch).with_claims(claims).with_history([change]))
            .await
            .map_err(|err| ClaimError::from_commit(err, &number))?;
        info!(batch = %batch.batch_number, "Batch submitted");
        Ok(batch)
    }

    /// Records the payer's per-claim outcome for a submitted batch
    ///
    /// A response for a claim outside the batch, or one the claim cannot
    /// accept, is reported in `errors` and leaves that claim untouched.
    #[instrument(skip(self, responses), fields(responses = responses.len()))]
    pub async fn record_response(
        &self,
        batch_id: BatchId,
        responses: Vec<ClaimResponse>,
        payment: Option<BatchPayment>,
        actor: &str,
    ) -> Result<ResponseResult, ClaimError> {
        let mut batch = self.batch(batch_id).await?;
        if !batch.accepts_responses() {
            return Err(ClaimError::BatchNotSubmitted);
        }

        let paid_at = payment.map(|p| p.paid_at);
        let mut result = ResponseResult::default();
        let mut touched: HashMap<ClaimId, Claim> = HashMap::new();

        for response in &responses {
            if !batch.contains(response.claim_id) {
                result.errors.push(format!("Claim ID {} is not in this batch.", response.claim_id));
                continue;
            }

            let original = match touched.get(&response.claim_id) {
                Some(claim) => claim.clone(),
                None => load_claim(self.claims.as_ref(), response.claim_id).await?,
            };

            let mut claim = original.clone();
            match apply_response(&mut claim, response, actor, paid_at) {
                Ok(()) => {
                    batch.record_item_response(response)?;
                    touched.insert(claim.id, claim);
                    result.processed += 1;
                }
                Err(err) => {
                    warn!(claim = %original.claim_check_code, error = %err, "Payer response not applied");
                    result.errors.push(format!("Claim {}: {}", original.claim_check_code, err));
                }
            }
        }

        batch.recalculate_totals()?;
        if let Some(payment) = payment {
            batch.paid_at = Some(payment.paid_at);
            if payment.paid_amount.is_some() {
                batch.paid_amount = payment.paid_amount;
            }
        }
        let changes = batch.settle_status(actor)?;

        let claims: Vec<Claim> = touched.into_values().collect();
        let number = batch.batch_number.clone();
        let batch = self
            .batches
            .commit(BatchCommit::batch(batch).with_claims(claims).with_history(changes))
            .await
            .map_err(|err| ClaimError::from_commit(err, &number))?;

        info!(
            batch = %batch.batch_number,
            status = %batch.status,
            processed = result.processed,
            errors = result.errors.len(),
            "Payer response recorded"
        );
        Ok(result)
    }
}

/// Moves a claim to match the payer's verdict
fn apply_response(
    claim: &mut Claim,
    response: &ClaimResponse,
    actor: &str,
    paid_at: Option<DateTime<Utc>>,
) -> Result<(), ClaimError> {
    match response.status {
        BatchItemStatus::Pending => Ok(()),
        BatchItemStatus::Approved => claim.approve(actor, response.approved_amount),
        BatchItemStatus::Rejected => claim.reject(actor, response.rejection_reason.as_deref().unwrap_or_default()),
        BatchItemStatus::Paid => {
            if claim.status == ClaimStatus::Submitted {
                claim.approve(actor, response.approved_amount)?;
            }
            claim.mark_paid(actor, response.approved_amount, paid_at)
        }
    }
}
