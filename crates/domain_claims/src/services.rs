//! Claim services
//!
//! [`ClaimService`] edits claims and drives their lifecycle;
//! [`ClaimVettingService`] vets them against the Tariff Master and G-DRG
//! tariffs. Both load a fully materialised claim, change it in memory and
//! save it back at the version it was loaded at.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use core_kernel::{ClaimId, ClaimItemId, Currency, GdrgTariffId, Money, PortError};
use domain_coverage::{CoverageRequest, CoverageService, ServiceCategory};
use domain_tariff::{GdrgPort, ItemKey, MappingPort, TariffEntry};

use crate::aggregator::{calculate_totals, ClaimTotals};
use crate::claim::{Claim, ClaimStatus, NewClaim, VettingDecision};
use crate::details::{ClaimDiagnosis, GdrgSelection};
use crate::error::ClaimError;
use crate::item::ClaimItem;
use crate::ports::ClaimPort;

/// A billable line to add to a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClaimItem {
    pub category: ServiceCategory,
    pub item: Option<ItemKey>,
    pub code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub item_date: NaiveDate,
}

pub(crate) async fn load_claim(claims: &dyn ClaimPort, id: ClaimId) -> Result<Claim, ClaimError> {
    claims.get_claim(id).await.map_err(|err| match err {
        PortError::NotFound { id, .. } => ClaimError::ClaimNotFound(id),
        other => other.into(),
    })
}

pub(crate) async fn store_claim(claims: &dyn ClaimPort, claim: &Claim) -> Result<Claim, ClaimError> {
    claims
        .save_claim(claim)
        .await
        .map_err(|err| ClaimError::from_save(err, &claim.claim_check_code))
}

/// Service for claim editing and status changes
#[derive(Clone)]
pub struct ClaimService {
    claims: Arc<dyn ClaimPort>,
    coverage: CoverageService,
    currency: Currency,
}

impl ClaimService {
    pub fn new(claims: Arc<dyn ClaimPort>, coverage: CoverageService) -> Self {
        Self {
            claims,
            coverage,
            currency: Currency::GHS,
        }
    }

    /// Opens a draft claim against a plan
    #[instrument(skip(self, new), fields(ccc = %new.claim_check_code))]
    pub async fn create_claim(&self, new: NewClaim) -> Result<Claim, ClaimError> {
        let plan = self.coverage.plan(new.plan_id).await?;
        let claim = Claim::draft(new, plan.is_nhis(), self.currency);
        let saved = store_claim(self.claims.as_ref(), &claim).await?;
        info!(claim = %saved.id, nhis = saved.is_nhis, "Claim created");
        Ok(saved)
    }

    pub async fn claim(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        load_claim(self.claims.as_ref(), id).await
    }

    /// Adds a line, priced through the plan's coverage strategy
    #[instrument(skip(self, new), fields(code = %new.code))]
    pub async fn add_item(&self, claim_id: ClaimId, new: NewClaimItem) -> Result<ClaimItem, ClaimError> {
        let mut claim = self.claim(claim_id).await?;
        claim.ensure_editable()?;

        let mut item = ClaimItem::new(claim.id, new.category, new.code, new.description, new.quantity, new.unit_price, new.item_date);
        item.item = new.item;
        self.price(&claim, &mut item).await?;

        claim.add_item(item.clone())?;
        store_claim(self.claims.as_ref(), &claim).await?;
        debug!(item = %item.id, insurance_pays = %item.insurance_pays, "Claim item added");
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        claim_id: ClaimId,
        item_id: ClaimItemId,
        quantity: u32,
    ) -> Result<ClaimItem, ClaimError> {
        let mut claim = self.claim(claim_id).await?;
        claim.ensure_editable()?;

        let mut item = claim.item(item_id)?.clone();
        item.set_quantity(quantity);
        self.price(&claim, &mut item).await?;

        claim.replace_item(item.clone())?;
        store_claim(self.claims.as_ref(), &claim).await?;
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, claim_id: ClaimId, item_id: ClaimItemId) -> Result<Claim, ClaimError> {
        let mut claim = self.claim(claim_id).await?;
        claim.remove_item(item_id)?;
        store_claim(self.claims.as_ref(), &claim).await
    }

    pub async fn replace_diagnoses(&self, claim_id: ClaimId, diagnoses: Vec<ClaimDiagnosis>) -> Result<Claim, ClaimError> {
        let mut claim = self.claim(claim_id).await?;
        claim.replace_diagnoses(diagnoses)?;
        store_claim(self.claims.as_ref(), &claim).await
    }

    #[instrument(skip(self))]
    pub async fn submit_for_vetting(&self, claim_id: ClaimId, actor: &str) -> Result<Claim, ClaimError> {
        self.apply(claim_id, |claim| claim.submit_for_vetting(actor)).await
    }

    /// Submits a single vetted claim outside of a batch
    #[instrument(skip(self))]
    pub async fn submit(&self, claim_id: ClaimId, actor: &str, submission_date: NaiveDate) -> Result<Claim, ClaimError> {
        self.apply(claim_id, |claim| claim.submit(actor, submission_date, None)).await
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, claim_id: ClaimId, actor: &str, approved_amount: Option<Money>) -> Result<Claim, ClaimError> {
        self.apply(claim_id, |claim| claim.approve(actor, approved_amount)).await
    }

    #[instrument(skip(self))]
    pub async fn reject(&self, claim_id: ClaimId, actor: &str, reason: &str) -> Result<Claim, ClaimError> {
        self.apply(claim_id, |claim| claim.reject(actor, reason)).await
    }

    #[instrument(skip(self))]
    pub async fn mark_paid(
        &self,
        claim_id: ClaimId,
        actor: &str,
        amount: Option<Money>,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Claim, ClaimError> {
        self.apply(claim_id, |claim| claim.mark_paid(actor, amount, paid_at)).await
    }

    #[instrument(skip(self))]
    pub async fn prepare_for_resubmission(&self, claim_id: ClaimId, actor: &str) -> Result<Claim, ClaimError> {
        self.apply(claim_id, |claim| claim.prepare_for_resubmission(actor)).await
    }

    pub async fn claims_in_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, ClaimError> {
        Ok(self.claims.claims_in_status(status).await?)
    }

    async fn apply<F>(&self, claim_id: ClaimId, change: F) -> Result<Claim, ClaimError>
    where
        F: FnOnce(&mut Claim) -> Result<(), ClaimError>,
    {
        let mut claim = self.claim(claim_id).await?;
        let from = claim.status;
        change(&mut claim)?;
        let saved = store_claim(self.claims.as_ref(), &claim).await?;
        info!(claim = %saved.id, from = %from, to = %saved.status, "Claim status changed");
        Ok(saved)
    }

    async fn price(&self, claim: &Claim, item: &mut ClaimItem) -> Result<(), ClaimError> {
        let mut request = CoverageRequest::new(
            claim.plan_id,
            item.category,
            item.code.clone(),
            item.unit_tariff,
            item.quantity,
            item.item_date,
        );
        request.item = item.item;
        let coverage = self.coverage.calculate(&request).await?;
        item.apply_coverage(&coverage);
        Ok(())
    }
}

/// A vetting request from an operator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VetRequest {
    pub actor: String,
    pub gdrg_id: Option<GdrgTariffId>,
    pub diagnoses: Option<Vec<ClaimDiagnosis>>,
    /// Version the operator was looking at, if known
    pub expected_version: Option<u64>,
}

impl VetRequest {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            ..Default::default()
        }
    }

    pub fn with_gdrg(mut self, gdrg_id: GdrgTariffId) -> Self {
        self.gdrg_id = Some(gdrg_id);
        self
    }

    pub fn with_diagnoses(mut self, diagnoses: Vec<ClaimDiagnosis>) -> Self {
        self.diagnoses = Some(diagnoses);
        self
    }

    pub fn at_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Service for claim vetting
#[derive(Clone)]
pub struct ClaimVettingService {
    claims: Arc<dyn ClaimPort>,
    mappings: Arc<dyn MappingPort>,
    gdrg: Arc<dyn GdrgPort>,
}

impl ClaimVettingService {
    pub fn new(claims: Arc<dyn ClaimPort>, mappings: Arc<dyn MappingPort>, gdrg: Arc<dyn GdrgPort>) -> Self {
        Self { claims, mappings, gdrg }
    }

    /// Vets a pending claim
    ///
    /// Freezes the selected G-DRG amount and the current Tariff Master
    /// price of every mapped line. Later tariff changes do not reach the
    /// vetted claim.
    ///
    /// # Errors
    ///
    /// `GdrgRequired` for an NHIS claim without a G-DRG and
    /// `ConcurrentModification` when the claim changed since it was read.
    #[instrument(skip(self, request), fields(actor = %request.actor))]
    pub async fn vet(&self, claim_id: ClaimId, request: VetRequest) -> Result<Claim, ClaimError> {
        let mut claim = load_claim(self.claims.as_ref(), claim_id).await?;
        if let Some(expected) = request.expected_version {
            if expected != claim.version {
                return Err(ClaimError::ConcurrentModification(claim.claim_check_code));
            }
        }

        let gdrg = match request.gdrg_id {
            Some(id) => Some(GdrgSelection::from(&self.gdrg.get_gdrg(id).await?)),
            None => None,
        };
        let nhis_tariffs = if claim.is_nhis {
            self.live_tariffs(&claim.items).await?
        } else {
            HashMap::new()
        };

        let totals = claim.vet(VettingDecision {
            actor: request.actor,
            gdrg,
            diagnoses: request.diagnoses,
            nhis_tariffs,
        })?;

        let saved = store_claim(self.claims.as_ref(), &claim).await?;
        info!(
            claim = %saved.id,
            grand_total = %totals.grand_total,
            unmapped = totals.unmapped_count,
            "Claim vetted"
        );
        Ok(saved)
    }

    /// Totals a claim would have if vetted now
    ///
    /// Claims already vetted report their frozen totals. Otherwise mapped
    /// lines are priced at the current Tariff Master price and the G-DRG is
    /// taken from `gdrg_id`, falling back to the claim's own selection.
    #[instrument(skip(self))]
    pub async fn preview_totals(&self, claim_id: ClaimId, gdrg_id: Option<GdrgTariffId>) -> Result<ClaimTotals, ClaimError> {
        let claim = load_claim(self.claims.as_ref(), claim_id).await?;
        if !claim.status.is_editable() {
            return claim.totals();
        }

        let gdrg_amount = match gdrg_id {
            Some(id) => Some(self.gdrg.get_gdrg(id).await?.tariff_price),
            None => claim.gdrg.as_ref().map(|g| g.amount),
        };

        let mut items = claim.items.clone();
        if claim.is_nhis {
            let live = self.live_tariffs(&items).await?;
            for item in &mut items {
                if let Some(tariff) = live.get(&item.id) {
                    item.freeze_nhis_price(tariff);
                }
            }
        }

        Ok(calculate_totals(claim.is_nhis, gdrg_amount, &items, claim.currency)?)
    }

    async fn live_tariffs(&self, items: &[ClaimItem]) -> Result<HashMap<ClaimItemId, TariffEntry>, ClaimError> {
        let mut tariffs = HashMap::new();
        for item in items {
            let Some(key) = item.item else { continue };
            if let Some(tariff) = self.mappings.tariff_for_item(key).await? {
                tariffs.insert(item.id, tariff);
            }
        }
        Ok(tariffs)
    }
}
