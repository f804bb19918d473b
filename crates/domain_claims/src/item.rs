//! Claim line items

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ClaimItemId, Money, TariffId};
use domain_coverage::{CoverageResult, RuleType, ServiceCategory};
use domain_tariff::{ItemKey, TariffEntry};

/// One billable line on a claim
///
/// `nhis_tariff_id`, `nhis_code` and `nhis_price` are written when the claim
/// is vetted and are never refreshed from the Tariff Master afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimItem {
    pub id: ClaimItemId,
    pub claim_id: ClaimId,
    pub item_date: NaiveDate,
    pub category: ServiceCategory,
    /// Catalogue key used to find the item's tariff mapping
    pub item: Option<ItemKey>,
    /// The hospital's own code for the item
    pub code: String,
    pub description: String,
    pub quantity: u32,
    /// Hospital unit price
    pub unit_tariff: Money,
    pub subtotal: Money,
    pub is_covered: bool,
    pub insurance_pays: Money,
    pub patient_pays: Money,
    pub rule_type: Option<RuleType>,
    pub requires_preauthorization: bool,
    pub nhis_tariff_id: Option<TariffId>,
    pub nhis_code: Option<String>,
    pub nhis_price: Option<Money>,
}

impl ClaimItem {
    pub fn new(
        claim_id: ClaimId,
        category: ServiceCategory,
        code: impl Into<String>,
        description: impl Into<String>,
        quantity: u32,
        unit_tariff: Money,
        item_date: NaiveDate,
    ) -> Self {
        let currency = unit_tariff.currency();
        Self {
            id: ClaimItemId::new_v7(),
            claim_id,
            item_date,
            category,
            item: None,
            code: code.into(),
            description: description.into(),
            quantity,
            unit_tariff,
            subtotal: unit_tariff.multiply(Decimal::from(quantity)).round_to_currency(),
            is_covered: false,
            insurance_pays: Money::zero(currency),
            patient_pays: Money::zero(currency),
            rule_type: None,
            requires_preauthorization: false,
            nhis_tariff_id: None,
            nhis_code: None,
            nhis_price: None,
        }
    }

    pub fn for_item(mut self, key: ItemKey) -> Self {
        self.item = Some(key);
        self
    }

    /// Copies a coverage calculation onto the line
    pub fn apply_coverage(&mut self, coverage: &CoverageResult) {
        self.subtotal = coverage.subtotal;
        self.is_covered = coverage.is_covered;
        self.insurance_pays = coverage.insurance_pays;
        self.patient_pays = coverage.patient_pays;
        self.rule_type = Some(coverage.rule_type);
        self.requires_preauthorization = coverage.requires_preauthorization;
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.subtotal = self.unit_tariff.multiply(Decimal::from(quantity)).round_to_currency();
    }

    /// Freezes the Tariff Master price the line will be claimed at
    ///
    /// A covered line's insurer share follows the frozen price and its
    /// patient copay stays as priced. An uncovered line keeps its split.
    pub fn freeze_nhis_price(&mut self, tariff: &TariffEntry) {
        self.nhis_tariff_id = Some(tariff.id);
        self.nhis_code = Some(tariff.code.clone());
        self.nhis_price = Some(tariff.price);
        if self.is_covered {
            if let Some(subtotal) = self.nhis_subtotal() {
                self.insurance_pays = subtotal.round_to_currency();
            }
        }
    }

    /// `nhis_price × quantity`, when the line has a frozen NHIS price
    pub fn nhis_subtotal(&self) -> Option<Money> {
        self.nhis_price
            .map(|price| price.multiply(Decimal::from(self.quantity)))
    }

    /// Whether the line counts towards the NHIS investigations,
    /// prescriptions or procedures totals
    pub fn is_nhis_priced_category(&self) -> bool {
        self.category.is_tariff_priced()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_tariff::{ItemType, TariffCategory};
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn test_new_item_computes_subtotal() {
        let item = ClaimItem::new(ClaimId::new(), ServiceCategory::Drug, "AMX", "Amoxicillin", 3, Money::ghs(dec!(2.50)), date());
        assert_eq!(item.subtotal.amount(), dec!(7.50));
        assert!(item.nhis_price.is_none());
    }

    #[test]
    fn test_frozen_price_survives_tariff_change() {
        let mut tariff = TariffEntry::new("AMOXYCAP1", "Amoxicillin", TariffCategory::Medicine, Money::ghs(dec!(1.20))).unwrap();
        let mut item = ClaimItem::new(ClaimId::new(), ServiceCategory::Drug, "AMX", "Amoxicillin", 10, Money::ghs(dec!(2)), date())
            .for_item(ItemKey::new(ItemType::Drug, 3));

        item.freeze_nhis_price(&tariff);
        tariff.update_price(Money::ghs(dec!(5))).unwrap();

        assert_eq!(item.nhis_price.unwrap().amount(), dec!(1.20));
        assert_eq!(item.nhis_subtotal().unwrap().amount(), dec!(12.00));
        assert!(item.insurance_pays.is_zero());
    }

    #[test]
    fn test_freezing_resyncs_covered_insurer_share() {
        let tariff = TariffEntry::new("AMOXYCAP1", "Amoxicillin", TariffCategory::Medicine, Money::ghs(dec!(1.50))).unwrap();
        let mut item = ClaimItem::new(ClaimId::new(), ServiceCategory::Drug, "AMX", "Amoxicillin", 4, Money::ghs(dec!(2)), date());
        item.is_covered = true;
        item.insurance_pays = Money::ghs(dec!(4.80));
        item.patient_pays = Money::ghs(dec!(1.00));

        item.freeze_nhis_price(&tariff);

        assert_eq!(item.insurance_pays.amount(), dec!(6.00));
        assert_eq!(item.patient_pays.amount(), dec!(1.00));
    }
}
