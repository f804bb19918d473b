//! Property-Based Test Generators

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::Money;
use domain_coverage::ServiceCategory;

/// Cedi amounts from 0.01 to 10,000.00
pub fn ghs_strategy() -> impl Strategy<Value = Money> {
    (1i64..1_000_000i64).prop_map(|cents| Money::ghs(Decimal::new(cents, 2)))
}

/// Copay amounts from 0.00 to 20.00
pub fn copay_strategy() -> impl Strategy<Value = Money> {
    (0i64..2_000i64).prop_map(|cents| Money::ghs(Decimal::new(cents, 2)))
}

pub fn quantity_strategy() -> impl Strategy<Value = u32> {
    1u32..60u32
}

/// Coverage percentages 0 to 100 with two decimals
pub fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Categories priced from the Tariff Master under NHIS
pub fn tariff_priced_category_strategy() -> impl Strategy<Value = ServiceCategory> {
    prop_oneof![
        Just(ServiceCategory::Drug),
        Just(ServiceCategory::Lab),
        Just(ServiceCategory::Procedure),
    ]
}
