//! Table layout and index maintenance
//!
//! Every write goes through a `put_*` method so the unique indexes stay in
//! step with the rows they cover.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::hash::Hash;

use chrono::Utc;

use core_kernel::{BatchId, ClaimId, CoverageRuleId, GdrgTariffId, InsuranceTariffId, MappingId, PlanId, TariffId};
use domain_claims::{BatchCommit, BatchStatusChange, Claim, ClaimBatch};
use domain_coverage::{CoverageRule, InsurancePlan, InsuranceTariff};
use domain_tariff::{GdrgTariff, HospitalItem, ItemKey, ItemMapping, TariffEntry};

use crate::error::StoreError;

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub tariffs: HashMap<TariffId, TariffEntry>,
    pub tariff_codes: HashMap<String, TariffId>,
    pub gdrg: HashMap<GdrgTariffId, GdrgTariff>,
    pub gdrg_codes: HashMap<String, GdrgTariffId>,
    pub mappings: HashMap<MappingId, ItemMapping>,
    pub mapping_keys: HashMap<ItemKey, MappingId>,
    pub items: BTreeMap<ItemKey, HospitalItem>,
    pub plans: HashMap<PlanId, InsurancePlan>,
    pub rules: HashMap<CoverageRuleId, CoverageRule>,
    pub insurance_tariffs: HashMap<InsuranceTariffId, InsuranceTariff>,
    pub claims: HashMap<ClaimId, Claim>,
    pub claim_codes: HashMap<String, ClaimId>,
    pub batches: HashMap<BatchId, ClaimBatch>,
    pub batch_numbers: HashMap<String, BatchId>,
    /// Append-only
    pub history: Vec<BatchStatusChange>,
}

/// Fails if `key` is already indexed to a different row
fn ensure_unique<K, Q, I>(
    index: &HashMap<K, I>,
    key: &Q,
    id: I,
    entity: &'static str,
    field: &'static str,
) -> Result<(), StoreError>
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + Display + ?Sized,
    I: PartialEq,
{
    match index.get(key) {
        Some(owner) if *owner != id => Err(StoreError::duplicate(entity, field, key)),
        _ => Ok(()),
    }
}

impl Tables {
    pub fn put_tariff(&mut self, tariff: TariffEntry) -> Result<(), StoreError> {
        ensure_unique(&self.tariff_codes, tariff.code.as_str(), tariff.id, "TariffEntry", "code")?;
        if let Some(previous) = self.tariffs.get(&tariff.id) {
            if previous.code != tariff.code {
                self.tariff_codes.remove(&previous.code);
            }
        }
        self.tariff_codes.insert(tariff.code.clone(), tariff.id);
        self.tariffs.insert(tariff.id, tariff);
        Ok(())
    }

    pub fn put_gdrg(&mut self, tariff: GdrgTariff) -> Result<(), StoreError> {
        ensure_unique(&self.gdrg_codes, tariff.code.as_str(), tariff.id, "GdrgTariff", "code")?;
        if let Some(previous) = self.gdrg.get(&tariff.id) {
            if previous.code != tariff.code {
                self.gdrg_codes.remove(&previous.code);
            }
        }
        self.gdrg_codes.insert(tariff.code.clone(), tariff.id);
        self.gdrg.insert(tariff.id, tariff);
        Ok(())
    }

    pub fn put_mapping(&mut self, mapping: ItemMapping) -> Result<(), StoreError> {
        ensure_unique(&self.mapping_keys, &mapping.key, mapping.id, "ItemMapping", "item")?;
        if let Some(previous) = self.mappings.get(&mapping.id) {
            if previous.key != mapping.key {
                self.mapping_keys.remove(&previous.key);
            }
        }
        self.mapping_keys.insert(mapping.key, mapping.id);
        self.mappings.insert(mapping.id, mapping);
        Ok(())
    }

    pub fn remove_mapping(&mut self, id: MappingId) -> Result<ItemMapping, StoreError> {
        let mapping = self
            .mappings
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("ItemMapping", id))?;
        self.mapping_keys.remove(&mapping.key);
        Ok(mapping)
    }

    /// Checks the version and code index of a claim without writing it
    fn check_claim(&self, claim: &Claim) -> Result<(), StoreError> {
        let stored_version = self.claims.get(&claim.id).map(|stored| stored.version).unwrap_or(0);
        if stored_version != claim.version {
            return Err(StoreError::stale("Claim", &claim.claim_check_code, claim.version, stored_version));
        }
        ensure_unique(&self.claim_codes, claim.claim_check_code.as_str(), claim.id, "Claim", "claim check code")
    }

    /// Writes a checked claim at the next version
    fn write_claim(&mut self, claim: &Claim) -> Claim {
        let mut stored = claim.clone();
        stored.version += 1;
        stored.updated_at = Utc::now();
        self.claim_codes.insert(stored.claim_check_code.clone(), stored.id);
        self.claims.insert(stored.id, stored.clone());
        stored
    }

    pub fn put_claim(&mut self, claim: &Claim) -> Result<Claim, StoreError> {
        self.check_claim(claim)?;
        Ok(self.write_claim(claim))
    }

    /// A claim may sit in at most one open batch
    fn check_open_membership(&self, batch: &ClaimBatch) -> Result<(), StoreError> {
        if !batch.is_open() {
            return Ok(());
        }
        let others: Vec<&ClaimBatch> = self
            .batches
            .values()
            .filter(|other| other.id != batch.id && other.is_open())
            .collect();
        match batch
            .items
            .iter()
            .find(|item| others.iter().any(|other| other.contains(item.claim_id)))
        {
            Some(item) => Err(StoreError::duplicate("ClaimBatch", "open claim", &item.claim_check_code)),
            None => Ok(()),
        }
    }

    /// Applies a batch commit, or nothing at all
    pub fn apply_commit(&mut self, commit: BatchCommit) -> Result<ClaimBatch, StoreError> {
        let BatchCommit { mut batch, claims, history } = commit;

        let stored_version = self.batches.get(&batch.id).map(|stored| stored.version).unwrap_or(0);
        if stored_version != batch.version {
            return Err(StoreError::stale("ClaimBatch", &batch.batch_number, batch.version, stored_version));
        }
        ensure_unique(&self.batch_numbers, batch.batch_number.as_str(), batch.id, "ClaimBatch", "batch number")?;
        self.check_open_membership(&batch)?;
        for claim in &claims {
            self.check_claim(claim)?;
        }

        for claim in &claims {
            self.write_claim(claim);
        }
        batch.version += 1;
        batch.updated_at = Utc::now();
        self.batch_numbers.insert(batch.batch_number.clone(), batch.id);
        self.batches.insert(batch.id, batch.clone());
        self.history.extend(history);

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Money;
    use domain_tariff::TariffCategory;
    use rust_decimal_macros::dec;

    fn tariff(code: &str) -> TariffEntry {
        TariffEntry::new(code, code, TariffCategory::Medicine, Money::ghs(dec!(1))).unwrap()
    }

    #[test]
    fn test_code_index_follows_renames() {
        let mut tables = Tables::default();
        let mut entry = tariff("OLD1");
        tables.put_tariff(entry.clone()).unwrap();

        entry.code = "NEW1".into();
        tables.put_tariff(entry.clone()).unwrap();

        assert!(!tables.tariff_codes.contains_key("OLD1"));
        assert_eq!(tables.tariff_codes.get("NEW1"), Some(&entry.id));
        tables.put_tariff(tariff("OLD1")).unwrap();
    }

    #[test]
    fn test_second_row_with_same_code_is_rejected() {
        let mut tables = Tables::default();
        tables.put_tariff(tariff("AMOXYCAP1")).unwrap();

        let err = tables.put_tariff(tariff("AMOXYCAP1")).unwrap_err();
        assert!(err.is_constraint_violation());
        assert_eq!(tables.tariffs.len(), 1);
    }
}
