//! Custom Test Assertions

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_claims::{Claim, ClaimItem};

/// Asserts a money value equals a cedi amount, ignoring scale
pub fn assert_ghs(actual: Money, expected: Decimal) {
    assert_eq!(
        actual.amount().normalize(),
        expected.normalize(),
        "expected GHS {}, got {}",
        expected,
        actual
    );
}

/// Asserts the insurer and patient shares of a line add up to its subtotal
pub fn assert_line_split(item: &ClaimItem) {
    let split = item.insurance_pays.amount() + item.patient_pays.amount();
    assert_eq!(
        split.normalize(),
        item.subtotal.amount().normalize(),
        "line {} splits into {} + {} but its subtotal is {}",
        item.code,
        item.insurance_pays,
        item.patient_pays,
        item.subtotal
    );
}

/// Asserts a vetted claim's stored grand total matches its recomputed totals
pub fn assert_totals_consistent(claim: &Claim) {
    let totals = claim.totals().unwrap();
    assert_eq!(
        totals.grand_total, claim.total_claim_amount,
        "claim {} stores {} but its lines total {}",
        claim.claim_check_code, claim.total_claim_amount, totals.grand_total
    );
}
