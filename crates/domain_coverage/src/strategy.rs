//! Coverage strategies
//!
//! Both strategies are pure: they evaluate a request against a fully
//! materialised [`CoverageContext`] and never touch storage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{CoverageRuleId, Currency, Money, PlanId, Rate};
use domain_tariff::{ItemKey, TariffEntry};

use crate::category::ServiceCategory;
use crate::error::CoverageError;
use crate::plan::{InsurancePlan, InsuranceTariff};
use crate::rule::{resolve_flexible_copay, resolve_rule, CoverageRule, CoverageType, ResolvedRule, RuleType};

/// One billable line to price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRequest {
    pub plan_id: PlanId,
    pub category: ServiceCategory,
    /// Hospital item code used for item-specific rules
    pub item_code: String,
    /// The hospital's own unit price
    pub hospital_price: Money,
    pub quantity: u32,
    /// Catalogue key used for the NHIS tariff lookup
    pub item: Option<ItemKey>,
    pub date: NaiveDate,
}

impl CoverageRequest {
    pub fn new(
        plan_id: PlanId,
        category: ServiceCategory,
        item_code: impl Into<String>,
        hospital_price: Money,
        quantity: u32,
        date: NaiveDate,
    ) -> Self {
        Self {
            plan_id,
            category,
            item_code: item_code.into(),
            hospital_price,
            quantity,
            item: None,
            date,
        }
    }

    pub fn for_item(mut self, key: ItemKey) -> Self {
        self.item = Some(key);
        self
    }

    fn quantity_decimal(&self) -> Decimal {
        Decimal::from(self.quantity)
    }

    fn currency(&self) -> Currency {
        self.hospital_price.currency()
    }
}

/// Everything a strategy needs, loaded up front
#[derive(Debug, Clone)]
pub struct CoverageContext {
    pub plan: InsurancePlan,
    /// The plan's rules for the request's category
    pub rules: Vec<CoverageRule>,
    /// Tariff Master entry the item is mapped to, if any
    pub mapped_tariff: Option<TariffEntry>,
    /// The plan's own price for the item, standard plans only
    pub insurance_tariff: Option<InsuranceTariff>,
}

/// Which pricing path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageKind {
    Nhis,
    NhisNotMapped,
    NhisUnmappedWithCopay,
    Full,
    Percentage,
    Fixed,
    Excluded,
}

impl From<CoverageType> for CoverageKind {
    fn from(value: CoverageType) -> Self {
        match value {
            CoverageType::Full => CoverageKind::Full,
            CoverageType::Percentage => CoverageKind::Percentage,
            CoverageType::Fixed => CoverageKind::Fixed,
            CoverageType::Excluded => CoverageKind::Excluded,
        }
    }
}

/// Insurer / patient split for one line, money rounded to 2 decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub is_covered: bool,
    pub insurance_pays: Money,
    pub patient_pays: Money,
    pub subtotal: Money,
    pub coverage_percentage: Decimal,
    pub rule_type: RuleType,
    pub rule_id: Option<CoverageRuleId>,
    pub coverage_kind: CoverageKind,
    /// Unit price the split was computed from
    pub effective_price: Money,
    pub nhis_code: Option<String>,
    pub is_nhis: bool,
    pub is_unmapped: bool,
    pub requires_preauthorization: bool,
    pub exceeded_limit: bool,
    pub limit_message: Option<String>,
}

impl CoverageResult {
    /// A line the insurer does not cover at all
    fn not_covered(effective_price: Money, subtotal: Money, kind: CoverageKind, is_nhis: bool) -> Self {
        Self {
            is_covered: false,
            insurance_pays: Money::zero(subtotal.currency()),
            patient_pays: subtotal,
            subtotal,
            coverage_percentage: dec!(0),
            rule_type: RuleType::None,
            rule_id: None,
            coverage_kind: kind,
            effective_price,
            nhis_code: None,
            is_nhis,
            is_unmapped: is_nhis,
            requires_preauthorization: false,
            exceeded_limit: false,
            limit_message: None,
        }
        .rounded()
    }

    fn rounded(mut self) -> Self {
        self.insurance_pays = self.insurance_pays.round_to_currency();
        self.patient_pays = self.patient_pays.round_to_currency();
        self.subtotal = self.subtotal.round_to_currency();
        self.effective_price = self.effective_price.round_to_currency();
        self.coverage_percentage = self.coverage_percentage.round_dp(2);
        self
    }
}

/// A way of splitting a line between insurer and patient
pub trait CoverageStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the evaluation needs the item's Tariff Master entry
    fn requires_tariff_lookup(&self) -> bool;

    fn evaluate(&self, request: &CoverageRequest, context: &CoverageContext) -> Result<CoverageResult, CoverageError>;
}

/// Picks the strategy for a plan
pub fn strategy_for(plan: &InsurancePlan) -> Box<dyn CoverageStrategy> {
    if plan.is_nhis() {
        Box::new(NhisCoverageStrategy)
    } else {
        Box::new(StandardCoverageStrategy)
    }
}

/// NHIS pricing
///
/// A mapped item is paid by the insurer at the Tariff Master price regardless
/// of the hospital price. The patient pays only a fixed copay per unit from
/// the resolved rule; percentage copays are ignored. An unmapped item is not
/// covered unless a copay rule exists for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NhisCoverageStrategy;

impl NhisCoverageStrategy {
    fn evaluate_mapped(
        &self,
        request: &CoverageRequest,
        context: &CoverageContext,
        tariff: &TariffEntry,
    ) -> Result<CoverageResult, CoverageError> {
        let qty = request.quantity_decimal();
        let currency = request.currency();
        let effective_price = Money::new(tariff.price.amount(), currency);
        let subtotal = effective_price.multiply(qty);

        let resolved = resolve_rule(&context.plan, &context.rules, request.category, &request.item_code, request.date);
        let copay = resolved
            .as_ref()
            .map(|r| r.rule.copay_for(qty, currency))
            .unwrap_or_else(|| Money::zero(currency));

        let (exceeded_limit, limit_message) = match &resolved {
            Some(r) => check_limits(&r.rule, request.quantity, &subtotal),
            None => (false, None),
        };

        Ok(CoverageResult {
            is_covered: true,
            insurance_pays: subtotal,
            patient_pays: copay,
            subtotal,
            coverage_percentage: percentage_of(&subtotal, &subtotal),
            rule_type: resolved.as_ref().map_or(RuleType::NhisDefault, |r| r.rule_type),
            rule_id: resolved.as_ref().and_then(ResolvedRule::rule_id),
            coverage_kind: CoverageKind::Nhis,
            effective_price,
            nhis_code: Some(tariff.code.clone()),
            is_nhis: true,
            is_unmapped: false,
            requires_preauthorization: resolved.as_ref().is_some_and(|r| r.rule.requires_preauthorization),
            exceeded_limit,
            limit_message,
        }
        .rounded())
    }

    fn evaluate_unmapped(&self, request: &CoverageRequest, context: &CoverageContext) -> CoverageResult {
        let qty = request.quantity_decimal();
        let currency = request.currency();
        let subtotal = request.hospital_price.multiply(qty);

        let copay_rule = resolve_flexible_copay(&context.rules, request.category, &request.item_code, request.date)
            .map(|rule| (rule.clone(), RuleType::FlexibleCopay, Some(rule.id)))
            .or_else(|| {
                resolve_rule(&context.plan, &context.rules, request.category, &request.item_code, request.date)
                    .filter(|resolved| resolved.rule.patient_copay_amount.is_some_and(|c| c.is_positive()))
                    .map(|resolved| {
                        let rule_id = resolved.rule_id();
                        (resolved.rule, resolved.rule_type, rule_id)
                    })
            });

        match copay_rule {
            Some((rule, rule_type, rule_id)) => CoverageResult {
                is_covered: true,
                insurance_pays: Money::zero(currency),
                patient_pays: rule.copay_for(qty, currency),
                subtotal,
                coverage_percentage: dec!(0),
                rule_type,
                rule_id,
                coverage_kind: CoverageKind::NhisUnmappedWithCopay,
                effective_price: request.hospital_price,
                nhis_code: None,
                is_nhis: true,
                is_unmapped: true,
                requires_preauthorization: rule.requires_preauthorization,
                exceeded_limit: false,
                limit_message: None,
            }
            .rounded(),
            None => CoverageResult::not_covered(request.hospital_price, subtotal, CoverageKind::NhisNotMapped, true),
        }
    }
}

impl CoverageStrategy for NhisCoverageStrategy {
    fn name(&self) -> &'static str {
        "nhis"
    }

    fn requires_tariff_lookup(&self) -> bool {
        true
    }

    fn evaluate(&self, request: &CoverageRequest, context: &CoverageContext) -> Result<CoverageResult, CoverageError> {
        match &context.mapped_tariff {
            Some(tariff) => self.evaluate_mapped(request, context, tariff),
            None => Ok(self.evaluate_unmapped(request, context)),
        }
    }
}

/// Rule-table pricing for private and corporate plans
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCoverageStrategy;

impl CoverageStrategy for StandardCoverageStrategy {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn requires_tariff_lookup(&self) -> bool {
        false
    }

    fn evaluate(&self, request: &CoverageRequest, context: &CoverageContext) -> Result<CoverageResult, CoverageError> {
        let qty = request.quantity_decimal();
        let currency = request.currency();
        let resolved = resolve_rule(&context.plan, &context.rules, request.category, &request.item_code, request.date);

        let effective_price = resolved
            .as_ref()
            .and_then(|r| r.rule.tariff_amount)
            .filter(Money::is_positive)
            .or_else(|| context.insurance_tariff.as_ref().map(|tariff| tariff.insurance_tariff))
            .unwrap_or(request.hospital_price);
        let subtotal = effective_price.multiply(qty);

        let resolved = match resolved {
            Some(resolved) if resolved.rule.is_covered => resolved,
            _ => {
                return Ok(CoverageResult::not_covered(effective_price, subtotal, CoverageKind::Excluded, false));
            }
        };
        let rule = &resolved.rule;

        let (mut insurance_pays, coverage_percentage) = match rule.coverage_type {
            CoverageType::Full => (subtotal, dec!(100)),
            CoverageType::Percentage => {
                let rate = Rate::from_percentage(rule.coverage_value);
                (rate.apply(&subtotal), rule.coverage_value)
            }
            CoverageType::Fixed => {
                let fixed = Money::new(rule.coverage_value, currency).multiply(qty);
                let pays = fixed.min(subtotal)?;
                (pays, percentage_of(&pays, &subtotal))
            }
            CoverageType::Excluded => (Money::zero(currency), dec!(0)),
        };

        let copay = rule.copay_for(qty, currency);
        let (exceeded_limit, limit_message) = check_limits(rule, request.quantity, &insurance_pays);

        // The copay is charged on top of the uncovered remainder, capped or not
        if let Some(cap) = rule.max_amount_per_visit {
            insurance_pays = insurance_pays.min(cap)?;
        }
        let insurance_pays = insurance_pays.round_to_currency();
        let patient_pays = subtotal.checked_sub(&insurance_pays)?.checked_add(&copay)?;

        Ok(CoverageResult {
            is_covered: true,
            insurance_pays,
            patient_pays,
            subtotal,
            coverage_percentage,
            rule_type: resolved.rule_type,
            rule_id: resolved.rule_id(),
            coverage_kind: rule.coverage_type.into(),
            effective_price,
            nhis_code: None,
            is_nhis: false,
            is_unmapped: false,
            requires_preauthorization: rule.requires_preauthorization,
            exceeded_limit,
            limit_message,
        }
        .rounded())
    }
}

/// Flags quantity and amount limits; the amount limit message wins when both trip
fn check_limits(rule: &CoverageRule, quantity: u32, insurance_pays: &Money) -> (bool, Option<String>) {
    let mut exceeded = false;
    let mut message = None;

    if let Some(max) = rule.max_quantity_per_visit {
        if quantity > max {
            exceeded = true;
            message = Some(format!("Quantity {} exceeds plan limit of {} per visit", quantity, max));
        }
    }

    if let Some(max) = rule.max_amount_per_visit {
        if insurance_pays.amount() > max.amount() {
            exceeded = true;
            message = Some(format!(
                "Insurance coverage amount exceeds plan limit of {:.2} per visit",
                max.amount()
            ));
        }
    }

    (exceeded, message)
}

fn percentage_of(part: &Money, whole: &Money) -> Decimal {
    if whole.is_zero() {
        dec!(0)
    } else {
        part.amount() / whole.amount() * dec!(100)
    }
}
