//! Claim aggregate

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ClaimItemId, Currency, Money, PatientId, PlanId};
use domain_tariff::TariffEntry;

use crate::aggregator::ClaimTotals;
use crate::details::{Attendance, ClaimDiagnosis, GdrgSelection, PatientDetails};
use crate::error::ClaimError;
use crate::item::ClaimItem;
use crate::workflow::{self, ClaimTransition};

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Draft,
    PendingVetting,
    Vetted,
    Submitted,
    Approved,
    Rejected,
    Paid,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingVetting => "pending_vetting",
            Self::Vetted => "vetted",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::PendingVetting)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data needed to open a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClaim {
    pub claim_check_code: String,
    pub patient_id: PatientId,
    pub plan_id: PlanId,
    pub patient: PatientDetails,
    pub attendance: Attendance,
    #[serde(default)]
    pub diagnoses: Vec<ClaimDiagnosis>,
}

/// Input to vetting, with every lookup already resolved
#[derive(Debug, Clone, Default)]
pub struct VettingDecision {
    pub actor: String,
    pub gdrg: Option<GdrgSelection>,
    /// Replaces the claim's diagnoses when present
    pub diagnoses: Option<Vec<ClaimDiagnosis>>,
    /// Current Tariff Master entry for each mapped line
    pub nhis_tariffs: HashMap<ClaimItemId, TariffEntry>,
}

/// An insurance claim for one patient attendance
///
/// `version` belongs to storage: it is the version the claim was loaded at,
/// and a save against a newer stored version is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    /// Claim Check Code issued for the attendance
    pub claim_check_code: String,
    pub patient_id: PatientId,
    pub plan_id: PlanId,
    pub is_nhis: bool,
    pub patient: PatientDetails,
    pub attendance: Attendance,
    pub diagnoses: Vec<ClaimDiagnosis>,
    pub gdrg: Option<GdrgSelection>,
    pub items: Vec<ClaimItem>,
    pub status: ClaimStatus,
    pub currency: Currency,
    pub total_claim_amount: Money,
    pub insurance_covered_amount: Money,
    pub patient_copay_amount: Money,
    pub approved_amount: Option<Money>,
    pub payment_amount: Option<Money>,
    pub vetted_by: Option<String>,
    pub vetted_at: Option<DateTime<Utc>>,
    pub submitted_by: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub submission_date: Option<NaiveDate>,
    /// Number of the batch the claim was submitted in
    pub batch_reference: Option<String>,
    pub approval_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    pub resubmission_count: u32,
    pub last_resubmitted_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub transitions: Vec<ClaimTransition>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Opens a draft claim
    pub fn draft(new: NewClaim, is_nhis: bool, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: ClaimId::new_v7(),
            claim_check_code: new.claim_check_code,
            patient_id: new.patient_id,
            plan_id: new.plan_id,
            is_nhis,
            patient: new.patient,
            attendance: new.attendance,
            diagnoses: new.diagnoses,
            gdrg: None,
            items: Vec::new(),
            status: ClaimStatus::Draft,
            currency,
            total_claim_amount: Money::zero(currency),
            insurance_covered_amount: Money::zero(currency),
            patient_copay_amount: Money::zero(currency),
            approved_amount: None,
            payment_amount: None,
            vetted_by: None,
            vetted_at: None,
            submitted_by: None,
            submitted_at: None,
            submission_date: None,
            batch_reference: None,
            approval_date: None,
            rejection_reason: None,
            rejected_by: None,
            rejected_at: None,
            payment_date: None,
            resubmission_count: 0,
            last_resubmitted_at: None,
            notes: None,
            transitions: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub fn item(&self, item_id: ClaimItemId) -> Result<&ClaimItem, ClaimError> {
        self.items
            .iter()
            .find(|item| item.id == item_id)
            .ok_or(ClaimError::ItemNotInClaim)
    }

    pub fn add_item(&mut self, item: ClaimItem) -> Result<(), ClaimError> {
        self.ensure_editable()?;
        if item.claim_id != self.id {
            return Err(ClaimError::ItemNotInClaim);
        }
        self.items.push(item);
        self.recalculate_amounts()
    }

    /// Replaces a line with an edited copy of itself
    pub fn replace_item(&mut self, item: ClaimItem) -> Result<(), ClaimError> {
        self.ensure_editable()?;
        let slot = self
            .items
            .iter_mut()
            .find(|existing| existing.id == item.id)
            .ok_or(ClaimError::ItemNotInClaim)?;
        *slot = item;
        self.recalculate_amounts()
    }

    pub fn remove_item(&mut self, item_id: ClaimItemId) -> Result<ClaimItem, ClaimError> {
        self.ensure_editable()?;
        let index = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(ClaimError::ItemNotInClaim)?;
        let removed = self.items.remove(index);
        self.recalculate_amounts()?;
        Ok(removed)
    }

    pub fn replace_diagnoses(&mut self, diagnoses: Vec<ClaimDiagnosis>) -> Result<(), ClaimError> {
        self.ensure_editable()?;
        self.diagnoses = diagnoses;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn primary_diagnosis(&self) -> Option<&ClaimDiagnosis> {
        self.diagnoses.iter().find(|d| d.is_primary)
    }

    pub fn totals(&self) -> Result<ClaimTotals, ClaimError> {
        Ok(ClaimTotals::for_claim(self)?)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub fn submit_for_vetting(&mut self, actor: &str) -> Result<(), ClaimError> {
        self.transition(ClaimStatus::PendingVetting, actor)
    }

    /// Vets the claim
    ///
    /// NHIS claims need a G-DRG, either in the decision or already selected.
    /// The G-DRG amount and every mapped line's Tariff Master price are
    /// frozen here. Covered lines are re-split at the frozen price and the
    /// claim total becomes the NHIS grand total.
    pub fn vet(&mut self, decision: VettingDecision) -> Result<ClaimTotals, ClaimError> {
        self.ensure_transition(ClaimStatus::Vetted)?;

        if let Some(gdrg) = decision.gdrg {
            self.gdrg = Some(gdrg);
        }
        if self.is_nhis && self.gdrg.is_none() {
            return Err(ClaimError::GdrgRequired);
        }
        if let Some(diagnoses) = decision.diagnoses {
            self.diagnoses = diagnoses;
        }

        if self.is_nhis {
            for item in &mut self.items {
                if let Some(tariff) = decision.nhis_tariffs.get(&item.id) {
                    item.freeze_nhis_price(tariff);
                }
            }
            self.recalculate_amounts()?;
        }

        let totals = self.totals()?;
        if self.is_nhis {
            self.total_claim_amount = totals.grand_total;
        }

        self.vetted_by = Some(decision.actor.clone());
        self.vetted_at = Some(Utc::now());
        self.transition(ClaimStatus::Vetted, &decision.actor)?;
        Ok(totals)
    }

    /// Marks the claim as sent to the payer
    pub fn submit(
        &mut self,
        actor: &str,
        submission_date: NaiveDate,
        batch_reference: Option<String>,
    ) -> Result<(), ClaimError> {
        self.ensure_transition(ClaimStatus::Submitted)?;
        self.submitted_by = Some(actor.to_string());
        self.submitted_at = Some(Utc::now());
        self.submission_date = Some(submission_date);
        self.batch_reference = batch_reference;
        self.transition(ClaimStatus::Submitted, actor)
    }

    /// Records payer approval; defaults the approved amount to the claim total
    pub fn approve(&mut self, actor: &str, approved_amount: Option<Money>) -> Result<(), ClaimError> {
        self.ensure_transition(ClaimStatus::Approved)?;
        if self.is_nhis && self.gdrg.is_none() {
            return Err(ClaimError::GdrgRequired);
        }
        self.approved_amount = Some(approved_amount.unwrap_or(self.total_claim_amount));
        self.approval_date = Some(Utc::now());
        self.transition(ClaimStatus::Approved, actor)
    }

    pub fn reject(&mut self, actor: &str, reason: &str) -> Result<(), ClaimError> {
        self.ensure_transition(ClaimStatus::Rejected)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ClaimError::RejectionReasonRequired);
        }
        self.rejection_reason = Some(reason.to_string());
        self.rejected_by = Some(actor.to_string());
        self.rejected_at = Some(Utc::now());
        self.transition(ClaimStatus::Rejected, actor)
    }

    pub fn mark_paid(
        &mut self,
        actor: &str,
        amount: Option<Money>,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<(), ClaimError> {
        self.ensure_transition(ClaimStatus::Paid)?;
        self.payment_amount = amount.or(self.approved_amount);
        self.payment_date = Some(paid_at.unwrap_or_else(Utc::now));
        self.transition(ClaimStatus::Paid, actor)
    }

    /// Resets a rejected claim to vetted so it can join a new batch
    ///
    /// The rejection reason is kept in the notes. Submission and rejection
    /// details are cleared.
    pub fn prepare_for_resubmission(&mut self, actor: &str) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::Rejected {
            return Err(self.invalid_transition(ClaimStatus::Vetted));
        }

        if let Some(reason) = self.rejection_reason.take() {
            let line = format!("Previous rejection reason: {}", reason);
            self.notes = Some(match self.notes.take() {
                Some(notes) if !notes.is_empty() => format!("{}\n\n{}", notes, line),
                _ => line,
            });
        }
        self.rejected_by = None;
        self.rejected_at = None;
        self.submitted_by = None;
        self.submitted_at = None;
        self.submission_date = None;
        self.batch_reference = None;

        self.resubmission_count += 1;
        self.last_resubmitted_at = Some(Utc::now());
        self.transition(ClaimStatus::Vetted, actor)
    }

    pub fn ensure_editable(&self) -> Result<(), ClaimError> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(ClaimError::ClaimNotEditable(self.status.to_string()))
        }
    }

    fn ensure_transition(&self, target: ClaimStatus) -> Result<(), ClaimError> {
        if workflow::is_allowed(self.status, target) {
            Ok(())
        } else {
            Err(self.invalid_transition(target))
        }
    }

    fn invalid_transition(&self, target: ClaimStatus) -> ClaimError {
        ClaimError::InvalidStatusTransition {
            from: self.status.to_string(),
            to: target.to_string(),
        }
    }

    fn transition(&mut self, target: ClaimStatus, actor: &str) -> Result<(), ClaimError> {
        self.ensure_transition(target)?;
        let now = Utc::now();
        self.transitions.push(ClaimTransition {
            from: self.status,
            to: target,
            actor: actor.to_string(),
            at: now,
        });
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    /// Recomputes the claim amounts from the lines
    fn recalculate_amounts(&mut self) -> Result<(), ClaimError> {
        self.total_claim_amount = Money::try_sum(self.currency, self.items.iter().map(|i| &i.subtotal))?;
        self.insurance_covered_amount = Money::try_sum(self.currency, self.items.iter().map(|i| &i.insurance_pays))?;
        self.patient_copay_amount = Money::try_sum(self.currency, self.items.iter().map(|i| &i.patient_pays))?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
