//! Tests for the coverage strategies and rule resolution

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{EffectivePeriod, Money};
use domain_coverage::{
    CategoryDefaults, CoverageContext, CoverageKind, CoverageRequest, CoverageRule, CoverageStrategy,
    InsurancePlan, InsuranceProvider, InsuranceTariff, NhisCoverageStrategy, RuleType, ServiceCategory,
    StandardCoverageStrategy,
};
use domain_tariff::{ItemKey, ItemType, TariffCategory, TariffEntry};

fn visit_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn nhis_plan() -> InsurancePlan {
    InsurancePlan::new("NHIS Standard", InsuranceProvider::nhis())
}

fn private_plan() -> InsurancePlan {
    InsurancePlan::new("Corporate Gold", InsuranceProvider::new("GLICO", "GLICO Healthcare", false))
}

fn tariff(price: Decimal) -> TariffEntry {
    TariffEntry::new("PARACETAB1", "Paracetamol 500mg", TariffCategory::Medicine, Money::ghs(price)).unwrap()
}

fn drug_request(plan: &InsurancePlan, hospital_price: Decimal, quantity: u32) -> CoverageRequest {
    CoverageRequest::new(plan.id, ServiceCategory::Drug, "DRG-PARA", Money::ghs(hospital_price), quantity, visit_date())
        .for_item(ItemKey::new(ItemType::Drug, 11))
}

// ============================================================================
// NHIS Strategy Tests
// ============================================================================

mod nhis_tests {
    use super::*;

    #[test]
    fn test_mapped_item_with_copay_rule() {
        let plan = nhis_plan();
        let copay = CoverageRule::percentage(plan.id, ServiceCategory::Drug, dec!(100))
            .for_item("DRG-PARA")
            .with_copay_amount(Money::ghs(dec!(4.50)));
        let context = CoverageContext {
            plan: plan.clone(),
            rules: vec![copay],
            mapped_tariff: Some(tariff(dec!(45.00))),
            insurance_tariff: None,
        };

        let result = NhisCoverageStrategy.evaluate(&drug_request(&plan, dec!(75.00), 1), &context).unwrap();

        assert!(result.is_covered);
        assert_eq!(result.insurance_pays.amount(), dec!(45.00));
        assert_eq!(result.patient_pays.amount(), dec!(4.50));
        assert_eq!(result.rule_type, RuleType::Specific);
        assert_eq!(result.coverage_kind, CoverageKind::Nhis);
        assert_eq!(result.effective_price.amount(), dec!(45.00));
    }

    #[test]
    fn test_category_rule_copay_used_when_no_item_rule() {
        let plan = nhis_plan();
        let general = CoverageRule::percentage(plan.id, ServiceCategory::Drug, dec!(100))
            .with_copay_amount(Money::ghs(dec!(2.00)));
        let context = CoverageContext {
            plan: plan.clone(),
            rules: vec![general],
            mapped_tariff: Some(tariff(dec!(10.00))),
            insurance_tariff: None,
        };

        let result = NhisCoverageStrategy.evaluate(&drug_request(&plan, dec!(12.00), 3), &context).unwrap();

        assert_eq!(result.insurance_pays.amount(), dec!(30.00));
        assert_eq!(result.patient_pays.amount(), dec!(6.00));
        assert_eq!(result.rule_type, RuleType::General);
    }

    #[test]
    fn test_percentage_copay_ignored_for_nhis() {
        let plan = nhis_plan();
        let percentage_only = CoverageRule::percentage(plan.id, ServiceCategory::Drug, dec!(50));
        let context = CoverageContext {
            plan: plan.clone(),
            rules: vec![percentage_only],
            mapped_tariff: Some(tariff(dec!(20.00))),
            insurance_tariff: None,
        };

        let result = NhisCoverageStrategy.evaluate(&drug_request(&plan, dec!(40.00), 2), &context).unwrap();

        assert_eq!(result.insurance_pays.amount(), dec!(40.00));
        assert!(result.patient_pays.is_zero());
    }

    #[test]
    fn test_unmapped_item_not_covered() {
        let plan = nhis_plan();
        let context = CoverageContext { plan: plan.clone(), rules: vec![], mapped_tariff: None, insurance_tariff: None };

        let result = NhisCoverageStrategy.evaluate(&drug_request(&plan, dec!(75.00), 2), &context).unwrap();

        assert!(!result.is_covered);
        assert!(result.is_unmapped);
        assert!(result.insurance_pays.is_zero());
        assert_eq!(result.patient_pays.amount(), dec!(150.00));
        assert_eq!(result.coverage_kind, CoverageKind::NhisNotMapped);
    }

    #[test]
    fn test_unmapped_item_with_flexible_copay() {
        let plan = nhis_plan();
        let flexible = CoverageRule::unmapped_copay(plan.id, ServiceCategory::Drug, "DRG-PARA", Money::ghs(dec!(5.00)));
        let context = CoverageContext { plan: plan.clone(), rules: vec![flexible], mapped_tariff: None, insurance_tariff: None };

        let result = NhisCoverageStrategy.evaluate(&drug_request(&plan, dec!(75.00), 2), &context).unwrap();

        assert!(result.is_covered);
        assert!(result.insurance_pays.is_zero());
        assert_eq!(result.patient_pays.amount(), dec!(10.00));
        assert_eq!(result.rule_type, RuleType::FlexibleCopay);
    }

    #[test]
    fn test_consultation_copay_without_item_mapping() {
        let plan = nhis_plan();
        let consultation = CoverageRule::full(plan.id, ServiceCategory::Consultation)
            .with_copay_amount(Money::ghs(dec!(10.00)));
        let context = CoverageContext { plan: plan.clone(), rules: vec![consultation], mapped_tariff: None, insurance_tariff: None };
        let request = CoverageRequest::new(plan.id, ServiceCategory::Consultation, "OPD", Money::ghs(dec!(50)), 1, visit_date());

        let result = NhisCoverageStrategy.evaluate(&request, &context).unwrap();

        assert!(result.is_covered);
        assert_eq!(result.patient_pays.amount(), dec!(10.00));
        assert_eq!(result.coverage_kind, CoverageKind::NhisUnmappedWithCopay);
    }

    #[test]
    fn test_amount_limit_flags_without_changing_split() {
        let plan = nhis_plan();
        let capped = CoverageRule::full(plan.id, ServiceCategory::Drug).with_max_amount(Money::ghs(dec!(50)));
        let context = CoverageContext {
            plan: plan.clone(),
            rules: vec![capped],
            mapped_tariff: Some(tariff(dec!(30.00))),
            insurance_tariff: None,
        };

        let result = NhisCoverageStrategy.evaluate(&drug_request(&plan, dec!(30), 2), &context).unwrap();

        assert!(result.exceeded_limit);
        assert_eq!(result.insurance_pays.amount(), dec!(60.00));
        assert!(result.limit_message.unwrap().contains("50.00"));
    }
}

// ============================================================================
// Standard Strategy Tests
// ============================================================================

mod standard_tests {
    use super::*;

    fn context(plan: &InsurancePlan, rules: Vec<CoverageRule>) -> CoverageContext {
        CoverageContext { plan: plan.clone(), rules, mapped_tariff: None, insurance_tariff: None }
    }

    fn lab_request(plan: &InsurancePlan, price: Decimal, quantity: u32) -> CoverageRequest {
        CoverageRequest::new(plan.id, ServiceCategory::Lab, "FBC", Money::ghs(price), quantity, visit_date())
    }

    #[test]
    fn test_percentage_split() {
        let plan = private_plan();
        let rule = CoverageRule::percentage(plan.id, ServiceCategory::Lab, dec!(80));

        let result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(150), 1), &context(&plan, vec![rule])).unwrap();

        assert_eq!(result.insurance_pays.amount(), dec!(120.00));
        assert_eq!(result.patient_pays.amount(), dec!(30.00));
        assert_eq!(result.coverage_percentage, dec!(80));
    }

    #[test]
    fn test_full_with_tariff_override_and_copay() {
        let plan = private_plan();
        let rule = CoverageRule::full(plan.id, ServiceCategory::Lab)
            .for_item("FBC")
            .with_tariff_amount(Money::ghs(dec!(40)))
            .with_copay_amount(Money::ghs(dec!(5)));

        let result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(60), 2), &context(&plan, vec![rule])).unwrap();

        assert_eq!(result.effective_price.amount(), dec!(40.00));
        assert_eq!(result.subtotal.amount(), dec!(80.00));
        assert_eq!(result.insurance_pays.amount(), dec!(80.00));
        assert_eq!(result.patient_pays.amount(), dec!(10.00));
        assert_eq!(result.rule_type, RuleType::Specific);
    }

    #[test]
    fn test_fixed_is_capped_at_subtotal() {
        let plan = private_plan();
        let rule = CoverageRule::fixed(plan.id, ServiceCategory::Lab, dec!(50));

        let result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(30), 1), &context(&plan, vec![rule])).unwrap();

        assert_eq!(result.insurance_pays.amount(), dec!(30.00));
        assert!(result.patient_pays.is_zero());
        assert_eq!(result.coverage_percentage, dec!(100));
    }

    #[test]
    fn test_excluded_and_missing_rule_not_covered() {
        let plan = private_plan();
        let excluded = CoverageRule::excluded(plan.id, ServiceCategory::Lab);

        let excluded_result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(25), 2), &context(&plan, vec![excluded])).unwrap();
        let missing_result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(25), 2), &context(&plan, vec![])).unwrap();

        for result in [excluded_result, missing_result] {
            assert!(!result.is_covered);
            assert_eq!(result.patient_pays.amount(), dec!(50.00));
            assert_eq!(result.rule_type, RuleType::None);
        }
    }

    #[test]
    fn test_category_default_applies() {
        let plan = private_plan().with_defaults(CategoryDefaults { labs: Some(dec!(60)), ..Default::default() });

        let result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(100), 1), &context(&plan, vec![])).unwrap();

        assert_eq!(result.insurance_pays.amount(), dec!(60.00));
        assert_eq!(result.rule_type, RuleType::CategoryDefault);
        assert!(result.rule_id.is_none());
    }

    #[test]
    fn test_amount_cap_moves_excess_to_patient() {
        let plan = private_plan();
        let rule = CoverageRule::full(plan.id, ServiceCategory::Lab).with_max_amount(Money::ghs(dec!(100)));

        let result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(75), 2), &context(&plan, vec![rule])).unwrap();

        assert!(result.exceeded_limit);
        assert_eq!(result.insurance_pays.amount(), dec!(100.00));
        assert_eq!(result.patient_pays.amount(), dec!(50.00));
    }

    #[test]
    fn test_copay_still_added_when_cap_applies() {
        let plan = private_plan();
        let rule = CoverageRule::full(plan.id, ServiceCategory::Lab)
            .with_max_amount(Money::ghs(dec!(100)))
            .with_copay_amount(Money::ghs(dec!(5)));

        let result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(75), 2), &context(&plan, vec![rule])).unwrap();

        assert_eq!(result.insurance_pays.amount(), dec!(100.00));
        assert_eq!(result.patient_pays.amount(), dec!(60.00));
    }

    #[test]
    fn test_quantity_limit_flagged() {
        let plan = private_plan();
        let rule = CoverageRule::full(plan.id, ServiceCategory::Lab).with_max_quantity(2);

        let result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(10), 3), &context(&plan, vec![rule])).unwrap();

        assert!(result.exceeded_limit);
        assert_eq!(result.limit_message.as_deref(), Some("Quantity 3 exceeds plan limit of 2 per visit"));
    }

    #[test]
    fn test_expired_rule_falls_back_to_general() {
        let plan = private_plan();
        let expired = CoverageRule::full(plan.id, ServiceCategory::Lab)
            .for_item("FBC")
            .effective(EffectivePeriod::new(None, NaiveDate::from_ymd_opt(2023, 12, 31)).unwrap());
        let general = CoverageRule::percentage(plan.id, ServiceCategory::Lab, dec!(50));

        let result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(100), 1), &context(&plan, vec![expired, general])).unwrap();

        assert_eq!(result.rule_type, RuleType::General);
        assert_eq!(result.insurance_pays.amount(), dec!(50.00));
    }

    #[test]
    fn test_rounding_to_two_places() {
        let plan = private_plan();
        let rule = CoverageRule::percentage(plan.id, ServiceCategory::Lab, dec!(33.333));

        let result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(10), 1), &context(&plan, vec![rule])).unwrap();

        assert_eq!(result.insurance_pays.amount(), dec!(3.33));
        assert_eq!(result.patient_pays.amount(), dec!(6.67));
    }

    #[test]
    fn test_latest_plan_tariff_in_force_wins() {
        let plan = private_plan();
        let june = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
        let standing = InsuranceTariff::new(plan.id, ServiceCategory::Lab, "FBC", Money::ghs(dec!(20)));
        let renegotiated = InsuranceTariff::new(plan.id, ServiceCategory::Lab, "FBC", Money::ghs(dec!(22)))
            .effective(EffectivePeriod::starting(june(1)));
        let upcoming = InsuranceTariff::new(plan.id, ServiceCategory::Lab, "FBC", Money::ghs(dec!(24)))
            .effective(EffectivePeriod::starting(june(15)));
        let other_item = InsuranceTariff::new(plan.id, ServiceCategory::Lab, "MAL-RDT", Money::ghs(dec!(9)));
        let tariffs = [standing, renegotiated, upcoming, other_item];

        let found = InsuranceTariff::in_force(&tariffs, plan.id, ServiceCategory::Lab, "FBC", june(3)).unwrap();
        assert_eq!(found.insurance_tariff.amount(), dec!(22));
        assert!(InsuranceTariff::in_force(&tariffs, plan.id, ServiceCategory::Drug, "FBC", june(3)).is_none());

        let rule = CoverageRule::percentage(plan.id, ServiceCategory::Lab, dec!(50));
        let context = CoverageContext { insurance_tariff: Some(found.clone()), ..context(&plan, vec![rule]) };
        let result = StandardCoverageStrategy.evaluate(&lab_request(&plan, dec!(30), 2), &context).unwrap();

        assert_eq!(result.subtotal.amount(), dec!(44.00));
        assert_eq!(result.insurance_pays.amount(), dec!(22.00));
        assert_eq!(result.patient_pays.amount(), dec!(22.00));
    }

    #[test]
    fn test_plan_tariff_must_be_positive() {
        let plan = private_plan();
        assert!(InsuranceTariff::new(plan.id, ServiceCategory::Lab, "FBC", Money::ghs(dec!(0))).validate().is_err());
        assert!(InsuranceTariff::new(plan.id, ServiceCategory::Lab, " ", Money::ghs(dec!(5))).validate().is_err());
        assert!(InsuranceTariff::new(plan.id, ServiceCategory::Lab, "FBC", Money::ghs(dec!(5))).validate().is_ok());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn nhis_insurer_pays_tariff_regardless_of_hospital_price(
            tariff_cents in 0i64..1_000_000,
            hospital_cents in 0i64..1_000_000,
            quantity in 0u32..50,
        ) {
            let plan = nhis_plan();
            let price = Decimal::new(tariff_cents, 2);
            let context = CoverageContext { plan: plan.clone(), rules: vec![], mapped_tariff: Some(tariff(price)), insurance_tariff: None };

            let result = NhisCoverageStrategy
                .evaluate(&drug_request(&plan, Decimal::new(hospital_cents, 2), quantity), &context)
                .unwrap();

            prop_assert_eq!(result.insurance_pays.amount(), price * Decimal::from(quantity));
        }

        #[test]
        fn nhis_patient_pays_only_fixed_copay(
            copay_cents in 0i64..10_000,
            percent in 0i64..=100,
            quantity in 0u32..20,
        ) {
            let plan = nhis_plan();
            let rule = CoverageRule::percentage(plan.id, ServiceCategory::Drug, Decimal::from(percent))
                .with_copay_amount(Money::ghs(Decimal::new(copay_cents, 2)));
            let context = CoverageContext { plan: plan.clone(), rules: vec![rule], mapped_tariff: Some(tariff(dec!(45))), insurance_tariff: None };

            let result = NhisCoverageStrategy.evaluate(&drug_request(&plan, dec!(75), quantity), &context).unwrap();

            prop_assert_eq!(result.patient_pays.amount(), Decimal::new(copay_cents, 2) * Decimal::from(quantity));
        }

        #[test]
        fn standard_split_sums_to_subtotal_without_copay(
            price_cents in 0i64..1_000_000,
            percent in 0i64..=100,
            quantity in 0u32..20,
        ) {
            let plan = private_plan();
            let rule = CoverageRule::percentage(plan.id, ServiceCategory::Lab, Decimal::from(percent));
            let context = CoverageContext { plan: plan.clone(), rules: vec![rule], mapped_tariff: None, insurance_tariff: None };
            let request = CoverageRequest::new(plan.id, ServiceCategory::Lab, "FBC", Money::ghs(Decimal::new(price_cents, 2)), quantity, visit_date());

            let result = StandardCoverageStrategy.evaluate(&request, &context).unwrap();

            prop_assert_eq!(result.insurance_pays.amount() + result.patient_pays.amount(), result.subtotal.amount());
        }
    }
}
