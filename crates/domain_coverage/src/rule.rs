//! Coverage rules and rule resolution
//!
//! A rule with `item_code = None` is the category-wide rule. A rule with an
//! item code is an exception for that item and takes precedence. When a plan
//! has neither, its category default becomes a virtual percentage rule.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CoreError, CoverageRuleId, Currency, EffectivePeriod, Money, PlanId};

use crate::category::ServiceCategory;
use crate::plan::InsurancePlan;

/// How a rule splits the cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageType {
    /// Insurer pays `coverage_value` percent
    Percentage,
    /// Insurer pays everything
    Full,
    /// Insurer pays `coverage_value` per unit, capped at the subtotal
    Fixed,
    /// Insurer pays nothing
    Excluded,
}

/// Where the rule applied to a calculation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Specific,
    General,
    /// Virtual rule built from the plan's category default
    CategoryDefault,
    /// NHIS mapped item with no rule: zero copay
    NhisDefault,
    /// Unmapped NHIS item with an explicit copay rule
    FlexibleCopay,
    None,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuleType::Specific => "specific",
            RuleType::General => "general",
            RuleType::CategoryDefault => "category_default",
            RuleType::NhisDefault => "nhis_default",
            RuleType::FlexibleCopay => "flexible_copay",
            RuleType::None => "none",
        };
        f.write_str(label)
    }
}

/// A coverage rule for one plan and category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRule {
    pub id: CoverageRuleId,
    pub plan_id: PlanId,
    pub category: ServiceCategory,
    /// Hospital item code this rule is an exception for
    pub item_code: Option<String>,
    pub coverage_type: CoverageType,
    /// Percentage for `Percentage`, per-unit amount for `Fixed`
    pub coverage_value: Decimal,
    pub patient_copay_percentage: Decimal,
    /// Fixed copay per unit
    pub patient_copay_amount: Option<Money>,
    /// Price override used instead of the hospital price
    pub tariff_amount: Option<Money>,
    pub is_covered: bool,
    /// Copay rule for an NHIS item that has no tariff mapping
    pub is_unmapped: bool,
    pub max_quantity_per_visit: Option<u32>,
    pub max_amount_per_visit: Option<Money>,
    pub requires_preauthorization: bool,
    pub period: EffectivePeriod,
    pub is_active: bool,
}

impl CoverageRule {
    fn base(plan_id: PlanId, category: ServiceCategory, coverage_type: CoverageType, coverage_value: Decimal) -> Self {
        Self {
            id: CoverageRuleId::new_v7(),
            plan_id,
            category,
            item_code: None,
            coverage_type,
            coverage_value,
            patient_copay_percentage: dec!(0),
            patient_copay_amount: None,
            tariff_amount: None,
            is_covered: coverage_type != CoverageType::Excluded,
            is_unmapped: false,
            max_quantity_per_visit: None,
            max_amount_per_visit: None,
            requires_preauthorization: false,
            period: EffectivePeriod::always(),
            is_active: true,
        }
    }

    pub fn percentage(plan_id: PlanId, category: ServiceCategory, percent: Decimal) -> Self {
        let mut rule = Self::base(plan_id, category, CoverageType::Percentage, percent);
        rule.patient_copay_percentage = dec!(100) - percent;
        rule
    }

    pub fn full(plan_id: PlanId, category: ServiceCategory) -> Self {
        Self::base(plan_id, category, CoverageType::Full, dec!(100))
    }

    pub fn fixed(plan_id: PlanId, category: ServiceCategory, per_unit: Decimal) -> Self {
        Self::base(plan_id, category, CoverageType::Fixed, per_unit)
    }

    pub fn excluded(plan_id: PlanId, category: ServiceCategory) -> Self {
        Self::base(plan_id, category, CoverageType::Excluded, dec!(0))
    }

    /// A copay-only rule for an NHIS item that has no tariff mapping
    pub fn unmapped_copay(plan_id: PlanId, category: ServiceCategory, item_code: impl Into<String>, copay: Money) -> Self {
        let mut rule = Self::base(plan_id, category, CoverageType::Full, dec!(0));
        rule.item_code = Some(item_code.into());
        rule.patient_copay_amount = Some(copay);
        rule.is_unmapped = true;
        rule
    }

    pub fn for_item(mut self, item_code: impl Into<String>) -> Self {
        self.item_code = Some(item_code.into());
        self
    }

    pub fn with_copay_amount(mut self, copay: Money) -> Self {
        self.patient_copay_amount = Some(copay);
        self
    }

    pub fn with_tariff_amount(mut self, tariff: Money) -> Self {
        self.tariff_amount = Some(tariff);
        self
    }

    pub fn with_max_quantity(mut self, max: u32) -> Self {
        self.max_quantity_per_visit = Some(max);
        self
    }

    pub fn with_max_amount(mut self, max: Money) -> Self {
        self.max_amount_per_visit = Some(max);
        self
    }

    pub fn effective(mut self, period: EffectivePeriod) -> Self {
        self.period = period;
        self
    }

    pub fn requiring_preauthorization(mut self) -> Self {
        self.requires_preauthorization = true;
        self
    }

    pub fn not_covered(mut self) -> Self {
        self.is_covered = false;
        self
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Checks value ranges before a rule is stored
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.coverage_value.is_sign_negative() && !self.coverage_value.is_zero() {
            return Err(CoreError::validation("Coverage value must not be negative"));
        }
        if self.coverage_type == CoverageType::Percentage && self.coverage_value > dec!(100) {
            return Err(CoreError::validation(format!(
                "Coverage percentage must be between 0 and 100, got {}",
                self.coverage_value
            )));
        }
        if let Some(copay) = &self.patient_copay_amount {
            if copay.is_negative() {
                return Err(CoreError::validation("Copay amount must not be negative"));
            }
        }
        if self.is_unmapped && self.item_code.is_none() {
            return Err(CoreError::validation("Unmapped copay rules must name an item code"));
        }
        Ok(())
    }

    pub fn is_specific(&self) -> bool {
        self.item_code.is_some()
    }

    /// Active and effective on the given date
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.is_active && self.period.contains(date)
    }

    pub fn rule_type(&self) -> RuleType {
        if self.is_specific() {
            RuleType::Specific
        } else {
            RuleType::General
        }
    }

    /// Fixed copay for a quantity, zero when the rule has none
    pub fn copay_for(&self, quantity: Decimal, currency: Currency) -> Money {
        self.patient_copay_amount
            .map(|copay| copay.multiply(quantity))
            .unwrap_or_else(|| Money::zero(currency))
    }
}

/// A rule picked for a calculation, with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRule {
    pub rule: CoverageRule,
    pub rule_type: RuleType,
    /// False for rules synthesised from plan defaults
    pub persisted: bool,
}

impl ResolvedRule {
    pub fn rule_id(&self) -> Option<CoverageRuleId> {
        self.persisted.then_some(self.rule.id)
    }
}

/// Picks the rule that applies to an item on a date
///
/// `rules` are the plan's rules for the item's category. An effective
/// item-specific rule wins, then an effective category rule, then the plan's
/// category default. Among several effective candidates the one with the
/// latest `effective_from` is used.
pub fn resolve_rule(
    plan: &InsurancePlan,
    rules: &[CoverageRule],
    category: ServiceCategory,
    item_code: &str,
    date: NaiveDate,
) -> Option<ResolvedRule> {
    let specific = latest_effective(rules.iter().filter(|rule| {
        rule.category == category && rule.item_code.as_deref() == Some(item_code)
    }), date);
    if let Some(rule) = specific {
        return Some(ResolvedRule {
            rule: rule.clone(),
            rule_type: RuleType::Specific,
            persisted: true,
        });
    }

    let general = latest_effective(
        rules.iter().filter(|rule| rule.category == category && rule.item_code.is_none()),
        date,
    );
    if let Some(rule) = general {
        return Some(ResolvedRule {
            rule: rule.clone(),
            rule_type: RuleType::General,
            persisted: true,
        });
    }

    plan.category_default(category).map(|percent| {
        let mut rule = CoverageRule::percentage(plan.id, category, percent);
        rule.is_covered = percent > dec!(0);
        ResolvedRule {
            rule,
            rule_type: RuleType::CategoryDefault,
            persisted: false,
        }
    })
}

/// Finds an unmapped-item copay rule for an item code
pub fn resolve_flexible_copay<'a>(
    rules: &'a [CoverageRule],
    category: ServiceCategory,
    item_code: &str,
    date: NaiveDate,
) -> Option<&'a CoverageRule> {
    latest_effective(
        rules.iter().filter(|rule| {
            rule.is_unmapped
                && rule.category == category
                && rule.item_code.as_deref() == Some(item_code)
                && rule.patient_copay_amount.is_some()
        }),
        date,
    )
}

fn latest_effective<'a, I>(candidates: I, date: NaiveDate) -> Option<&'a CoverageRule>
where
    I: Iterator<Item = &'a CoverageRule>,
{
    candidates
        .filter(|rule| rule.applies_on(date))
        .max_by_key(|rule| rule.period.from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{CategoryDefaults, InsuranceProvider};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan() -> InsurancePlan {
        InsurancePlan::new("Corporate Gold", InsuranceProvider::new("ACME", "Acme Health", false))
            .with_defaults(CategoryDefaults { labs: Some(dec!(70)), ..Default::default() })
    }

    #[test]
    fn test_specific_rule_beats_general() {
        let plan = plan();
        let rules = vec![
            CoverageRule::percentage(plan.id, ServiceCategory::Lab, dec!(50)),
            CoverageRule::full(plan.id, ServiceCategory::Lab).for_item("FBC"),
        ];

        let resolved = resolve_rule(&plan, &rules, ServiceCategory::Lab, "FBC", date(2024, 5, 1)).unwrap();
        assert_eq!(resolved.rule_type, RuleType::Specific);
        assert_eq!(resolved.rule.coverage_type, CoverageType::Full);

        let other = resolve_rule(&plan, &rules, ServiceCategory::Lab, "LFT", date(2024, 5, 1)).unwrap();
        assert_eq!(other.rule_type, RuleType::General);
    }

    #[test]
    fn test_category_default_is_virtual() {
        let plan = plan();
        let resolved = resolve_rule(&plan, &[], ServiceCategory::Lab, "FBC", date(2024, 5, 1)).unwrap();

        assert_eq!(resolved.rule_type, RuleType::CategoryDefault);
        assert_eq!(resolved.rule.coverage_value, dec!(70));
        assert!(resolved.rule_id().is_none());
        assert!(resolve_rule(&plan, &[], ServiceCategory::Ward, "BED", date(2024, 5, 1)).is_none());
    }

    #[test]
    fn test_latest_effective_rule_wins() {
        let plan = plan();
        let older = CoverageRule::percentage(plan.id, ServiceCategory::Drug, dec!(60))
            .effective(EffectivePeriod::starting(date(2023, 1, 1)));
        let newer = CoverageRule::percentage(plan.id, ServiceCategory::Drug, dec!(80))
            .effective(EffectivePeriod::starting(date(2024, 1, 1)));
        let rules = vec![older, newer];

        let in_2024 = resolve_rule(&plan, &rules, ServiceCategory::Drug, "X", date(2024, 3, 1)).unwrap();
        assert_eq!(in_2024.rule.coverage_value, dec!(80));

        let in_2023 = resolve_rule(&plan, &rules, ServiceCategory::Drug, "X", date(2023, 3, 1)).unwrap();
        assert_eq!(in_2023.rule.coverage_value, dec!(60));
    }

    #[test]
    fn test_inactive_rule_ignored() {
        let plan = plan();
        let mut rule = CoverageRule::full(plan.id, ServiceCategory::Procedure);
        rule.deactivate();

        assert!(resolve_rule(&plan, &[rule], ServiceCategory::Procedure, "P1", date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_validate_rejects_percentage_over_100() {
        let rule = CoverageRule::percentage(PlanId::new(), ServiceCategory::Lab, dec!(120));
        assert!(matches!(rule.validate(), Err(CoreError::Validation(_))));
    }
}
