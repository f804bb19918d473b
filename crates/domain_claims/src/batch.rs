//! Claim batches
//!
//! ```text
//! draft ──finalize──> finalized ──mark_submitted──> submitted ──> processing ──> completed
//! ```
//!
//! Claims can be added to or removed from a batch only while it is draft.
//! `processing` and `completed` are derived from the payer's per-claim
//! responses. Each status change yields one [`BatchStatusChange`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, ClaimId, Currency, Money, MoneyError};

use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;
use crate::history::BatchStatusChange;

/// Batch status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Draft,
    Finalized,
    Submitted,
    Processing,
    Completed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Finalized => "finalized",
            Self::Submitted => "submitted",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }

    fn can_transition_to(&self, target: BatchStatus) -> bool {
        use BatchStatus::*;
        matches!(
            (self, target),
            (Draft, Finalized) |
            (Finalized, Submitted) |
            (Submitted, Processing) |
            (Processing, Completed)
        )
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payer outcome for one claim in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchItemStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
}

impl BatchItemStatus {
    pub fn has_response(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for BatchItemStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "paid" => Ok(Self::Paid),
            other => Err(ClaimError::validation(format!("Invalid status '{}'", other))),
        }
    }
}

/// A claim's membership in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub claim_id: ClaimId,
    pub claim_check_code: String,
    /// Claim total when it was added
    pub claim_amount: Money,
    pub status: BatchItemStatus,
    pub approved_amount: Option<Money>,
    pub rejection_reason: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// A payer response for one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub claim_id: ClaimId,
    pub status: BatchItemStatus,
    pub approved_amount: Option<Money>,
    pub rejection_reason: Option<String>,
}

impl ClaimResponse {
    pub fn approved(claim_id: ClaimId, amount: Option<Money>) -> Self {
        Self { claim_id, status: BatchItemStatus::Approved, approved_amount: amount, rejection_reason: None }
    }

    pub fn rejected(claim_id: ClaimId, reason: impl Into<String>) -> Self {
        Self {
            claim_id,
            status: BatchItemStatus::Rejected,
            approved_amount: None,
            rejection_reason: Some(reason.into()),
        }
    }

    pub fn paid(claim_id: ClaimId, amount: Option<Money>) -> Self {
        Self { claim_id, status: BatchItemStatus::Paid, approved_amount: amount, rejection_reason: None }
    }
}

/// A bundle of vetted claims submitted to the payer together
///
/// Like claims, batches carry the storage `version` they were loaded at and
/// a commit from an older version is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimBatch {
    pub id: BatchId,
    /// `BATCH-YYYYMM-NNNN`
    pub batch_number: String,
    pub name: String,
    /// First day of the month being claimed for
    pub submission_period: NaiveDate,
    pub status: BatchStatus,
    pub items: Vec<BatchItem>,
    pub currency: Currency,
    pub total_claims: usize,
    pub total_amount: Money,
    pub approved_amount: Money,
    pub submitted_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_amount: Option<Money>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl ClaimBatch {
    /// Opens a draft batch together with its first history row
    pub fn create(
        batch_number: impl Into<String>,
        name: impl Into<String>,
        period: NaiveDate,
        created_by: impl Into<String>,
        notes: Option<String>,
        currency: Currency,
    ) -> (Self, BatchStatusChange) {
        let now = Utc::now();
        let created_by = created_by.into();
        let batch = Self {
            id: BatchId::new_v7(),
            batch_number: batch_number.into(),
            name: name.into(),
            submission_period: period.with_day(1).unwrap_or(period),
            status: BatchStatus::Draft,
            items: Vec::new(),
            currency,
            total_claims: 0,
            total_amount: Money::zero(currency),
            approved_amount: Money::zero(currency),
            submitted_at: None,
            paid_at: None,
            paid_amount: None,
            notes,
            created_by: created_by.clone(),
            created_at: now,
            updated_at: now,
            version: 0,
        };
        let change = BatchStatusChange::new(batch.id, None, BatchStatus::Draft, created_by, Some("Batch created"));
        (batch, change)
    }

    pub fn is_modifiable(&self) -> bool {
        self.status == BatchStatus::Draft
    }

    pub fn ensure_modifiable(&self) -> Result<(), ClaimError> {
        if self.is_modifiable() {
            Ok(())
        } else {
            Err(ClaimError::BatchNotModifiable)
        }
    }

    /// Not yet sent to the payer: draft or finalized
    pub fn is_open(&self) -> bool {
        matches!(self.status, BatchStatus::Draft | BatchStatus::Finalized)
    }

    pub fn contains(&self, claim_id: ClaimId) -> bool {
        self.items.iter().any(|item| item.claim_id == claim_id)
    }

    pub fn claim_ids(&self) -> Vec<ClaimId> {
        self.items.iter().map(|item| item.claim_id).collect()
    }

    /// Adds a vetted claim
    pub fn add_claim(&mut self, claim: &Claim) -> Result<(), ClaimError> {
        self.ensure_modifiable()?;
        if claim.status != ClaimStatus::Vetted {
            return Err(ClaimError::ClaimNotVetted(claim.claim_check_code.clone()));
        }
        if self.contains(claim.id) {
            return Err(ClaimError::AlreadyInBatch(claim.claim_check_code.clone()));
        }

        self.items.push(BatchItem {
            claim_id: claim.id,
            claim_check_code: claim.claim_check_code.clone(),
            claim_amount: claim.total_claim_amount,
            status: BatchItemStatus::Pending,
            approved_amount: None,
            rejection_reason: None,
            added_at: Utc::now(),
        });
        self.recalculate_totals()?;
        Ok(())
    }

    pub fn remove_claim(&mut self, claim_id: ClaimId) -> Result<BatchItem, ClaimError> {
        self.ensure_modifiable()?;
        let index = self
            .items
            .iter()
            .position(|item| item.claim_id == claim_id)
            .ok_or(ClaimError::ClaimNotInBatch)?;
        let removed = self.items.remove(index);
        self.recalculate_totals()?;
        Ok(removed)
    }

    pub fn finalize(&mut self, actor: &str) -> Result<BatchStatusChange, ClaimError> {
        if self.status != BatchStatus::Draft {
            return Err(ClaimError::BatchNotDraft);
        }
        if self.items.is_empty() {
            return Err(ClaimError::EmptyBatch);
        }
        self.transition(BatchStatus::Finalized, actor, Some("Batch finalized"))
    }

    pub fn mark_submitted(&mut self, actor: &str, submitted_at: DateTime<Utc>) -> Result<BatchStatusChange, ClaimError> {
        if self.status != BatchStatus::Finalized {
            return Err(ClaimError::BatchNotFinalized);
        }
        self.submitted_at = Some(submitted_at);
        self.transition(BatchStatus::Submitted, actor, Some("Batch submitted to NHIA"))
    }

    /// Whether payer responses may be recorded
    pub fn accepts_responses(&self) -> bool {
        matches!(self.status, BatchStatus::Submitted | BatchStatus::Processing)
    }

    /// Writes a payer response onto the claim's batch item
    ///
    /// Approved and paid responses default the approved amount to the claim
    /// amount.
    pub fn record_item_response(&mut self, response: &ClaimResponse) -> Result<&BatchItem, ClaimError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.claim_id == response.claim_id)
            .ok_or(ClaimError::ClaimNotInBatch)?;

        item.status = response.status;
        match response.status {
            BatchItemStatus::Approved | BatchItemStatus::Paid => {
                item.approved_amount = Some(response.approved_amount.unwrap_or(item.claim_amount));
            }
            BatchItemStatus::Rejected => {
                item.rejection_reason = response.rejection_reason.clone();
            }
            BatchItemStatus::Pending => {}
        }
        Ok(item)
    }

    /// Moves the batch forward from its items' responses
    ///
    /// Every item answered moves a submitted batch to processing; every item
    /// paid completes it. A submitted batch that is fully paid at once goes
    /// through processing first so the log keeps one row per step.
    pub fn settle_status(&mut self, actor: &str) -> Result<Vec<BatchStatusChange>, ClaimError> {
        let mut changes = Vec::new();
        if self.items.is_empty() {
            return Ok(changes);
        }

        let all_responded = self.items.iter().all(|item| item.status.has_response());
        let all_paid = self.items.iter().all(|item| item.status == BatchItemStatus::Paid);

        if all_responded && self.status == BatchStatus::Submitted {
            changes.push(self.transition(BatchStatus::Processing, actor, Some("All claims processed"))?);
        }
        if all_paid && self.status == BatchStatus::Processing {
            changes.push(self.transition(BatchStatus::Completed, actor, Some("All claims paid"))?);
        }
        Ok(changes)
    }

    /// Recomputes counts and amounts from the batch items
    pub fn recalculate_totals(&mut self) -> Result<(), MoneyError> {
        self.total_claims = self.items.len();
        self.total_amount = Money::try_sum(self.currency, self.items.iter().map(|i| &i.claim_amount))?;
        self.approved_amount = Money::try_sum(self.currency, self.items.iter().filter_map(|i| i.approved_amount.as_ref()))?;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn transition(&mut self, target: BatchStatus, actor: &str, notes: Option<&str>) -> Result<BatchStatusChange, ClaimError> {
        if !self.status.can_transition_to(target) {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        let change = BatchStatusChange::new(self.id, Some(self.status), target, actor, notes);
        self.status = target;
        self.updated_at = change.recorded_at;
        Ok(change)
    }
}

/// Prefix shared by every batch number of a month, e.g. `BATCH-202406-`
pub fn batch_number_prefix(at: DateTime<Utc>) -> String {
    format!("BATCH-{}-", at.format("%Y%m"))
}

/// Next number after the latest one issued under `prefix`
pub fn next_batch_number(prefix: &str, latest: Option<&str>) -> String {
    let sequence = latest
        .and_then(|number| number.strip_prefix(prefix))
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map_or(1, |last| last + 1);
    format!("{}{:04}", prefix, sequence)
}
