//! Claim total aggregation
//!
//! NHIS claims are priced as
//!
//! ```text
//! grand_total = gdrg + Σ lab (nhis_price × qty) + Σ drug (nhis_price × qty) + Σ procedure (nhis_price × qty)
//! ```
//!
//! Lines of those three categories without a frozen NHIS price are left out
//! of the sum and reported through `unmapped_count`. Other plans sum the
//! hospital subtotals and carry no G-DRG.

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError};
use domain_coverage::ServiceCategory;

use crate::claim::Claim;
use crate::item::ClaimItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimTotals {
    pub investigations: Money,
    pub prescriptions: Money,
    pub procedures: Money,
    pub gdrg: Money,
    pub grand_total: Money,
    pub unmapped_count: usize,
}

impl ClaimTotals {
    /// Totals of a claim from what is stored on it
    pub fn for_claim(claim: &Claim) -> Result<Self, MoneyError> {
        let gdrg = claim.gdrg.as_ref().map(|selection| selection.amount);
        calculate_totals(claim.is_nhis, gdrg, &claim.items, claim.currency)
    }
}

/// Aggregates lines into category totals and a grand total
pub fn calculate_totals(
    is_nhis: bool,
    gdrg_amount: Option<Money>,
    items: &[ClaimItem],
    currency: Currency,
) -> Result<ClaimTotals, MoneyError> {
    let investigations = category_total(items, ServiceCategory::Lab, is_nhis, currency)?;
    let prescriptions = category_total(items, ServiceCategory::Drug, is_nhis, currency)?;
    let procedures = category_total(items, ServiceCategory::Procedure, is_nhis, currency)?;

    let gdrg = match (is_nhis, gdrg_amount) {
        (true, Some(amount)) => amount,
        _ => Money::zero(currency),
    };

    let unmapped_count = if is_nhis {
        items
            .iter()
            .filter(|item| item.is_nhis_priced_category() && item.nhis_price.is_none())
            .count()
    } else {
        0
    };

    let grand_total = Money::try_sum(currency, [&gdrg, &investigations, &prescriptions, &procedures])?;

    Ok(ClaimTotals {
        investigations: investigations.round_to_currency(),
        prescriptions: prescriptions.round_to_currency(),
        procedures: procedures.round_to_currency(),
        gdrg: gdrg.round_to_currency(),
        grand_total: grand_total.round_to_currency(),
        unmapped_count,
    })
}

fn category_total(
    items: &[ClaimItem],
    category: ServiceCategory,
    is_nhis: bool,
    currency: Currency,
) -> Result<Money, MoneyError> {
    let lines = items.iter().filter(|item| item.category == category);

    if is_nhis {
        let priced: Vec<Money> = lines.filter_map(ClaimItem::nhis_subtotal).collect();
        Money::try_sum(currency, priced.iter())
    } else {
        Money::try_sum(currency, lines.map(|item| &item.subtotal))
    }
}
