//! Insurance plans and providers

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, EffectivePeriod, InsuranceTariffId, Money, PlanId, ProviderId};

use crate::category::ServiceCategory;

/// The payer behind a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceProvider {
    pub id: ProviderId,
    pub code: String,
    pub name: String,
    /// National Health Insurance Scheme provider
    pub is_nhis: bool,
}

impl InsuranceProvider {
    pub fn new(code: impl Into<String>, name: impl Into<String>, is_nhis: bool) -> Self {
        Self {
            id: ProviderId::new_v7(),
            code: code.into(),
            name: name.into(),
            is_nhis,
        }
    }

    pub fn nhis() -> Self {
        Self::new("NHIS", "National Health Insurance Scheme", true)
    }
}

/// Default coverage percentages applied when no rule exists for a category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefaults {
    pub consultation: Option<Decimal>,
    pub drugs: Option<Decimal>,
    pub labs: Option<Decimal>,
    pub procedures: Option<Decimal>,
}

/// An insurance plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsurancePlan {
    pub id: PlanId,
    pub name: String,
    pub provider: InsuranceProvider,
    pub defaults: CategoryDefaults,
    pub is_active: bool,
}

impl InsurancePlan {
    pub fn new(name: impl Into<String>, provider: InsuranceProvider) -> Self {
        Self {
            id: PlanId::new_v7(),
            name: name.into(),
            provider,
            defaults: CategoryDefaults::default(),
            is_active: true,
        }
    }

    pub fn with_defaults(mut self, defaults: CategoryDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn is_nhis(&self) -> bool {
        self.provider.is_nhis
    }

    /// Default coverage percentage for a category, if the plan sets one.
    /// Ward, nursing and consumables never have plan-level defaults.
    pub fn category_default(&self, category: ServiceCategory) -> Option<Decimal> {
        match category {
            ServiceCategory::Consultation => self.defaults.consultation,
            ServiceCategory::Drug => self.defaults.drugs,
            ServiceCategory::Lab => self.defaults.labs,
            ServiceCategory::Procedure => self.defaults.procedures,
            ServiceCategory::Consumable | ServiceCategory::Ward | ServiceCategory::Nursing => None,
        }
    }
}

/// A plan's negotiated price for one hospital item
///
/// Standard coverage prices a line at this amount when the matching rule
/// carries no `tariff_amount` of its own. Several rows may exist for the
/// same item over time; the one that started most recently wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceTariff {
    pub id: InsuranceTariffId,
    pub plan_id: PlanId,
    pub category: ServiceCategory,
    pub item_code: String,
    pub insurance_tariff: Money,
    pub period: EffectivePeriod,
}

impl InsuranceTariff {
    pub fn new(plan_id: PlanId, category: ServiceCategory, item_code: impl Into<String>, price: Money) -> Self {
        Self {
            id: InsuranceTariffId::new_v7(),
            plan_id,
            category,
            item_code: item_code.into(),
            insurance_tariff: price,
            period: EffectivePeriod::always(),
        }
    }

    pub fn effective(mut self, period: EffectivePeriod) -> Self {
        self.period = period;
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.item_code.trim().is_empty() {
            return Err(CoreError::validation("Insurance tariff must name an item code"));
        }
        if !self.insurance_tariff.is_positive() {
            return Err(CoreError::validation("Insurance tariff must be greater than zero"));
        }
        Ok(())
    }

    pub fn applies_to(&self, plan_id: PlanId, category: ServiceCategory, item_code: &str, date: NaiveDate) -> bool {
        self.plan_id == plan_id && self.category == category && self.item_code == item_code && self.period.contains(date)
    }

    /// Picks the tariff in force on `date`, latest start first
    pub fn in_force<'a, I>(tariffs: I, plan_id: PlanId, category: ServiceCategory, item_code: &str, date: NaiveDate) -> Option<&'a Self>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        tariffs
            .into_iter()
            .filter(|tariff| tariff.applies_to(plan_id, category, item_code, date))
            .max_by_key(|tariff| tariff.period.from)
    }
}
