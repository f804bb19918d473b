//! Tariff Master entries and G-DRG tariffs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{GdrgTariffId, Money, TariffId};

use crate::error::TariffError;

/// Category of an NHIS tariff entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffCategory {
    Medicine,
    Lab,
    Procedure,
    Consultation,
    Consumable,
}

impl TariffCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TariffCategory::Medicine => "medicine",
            TariffCategory::Lab => "lab",
            TariffCategory::Procedure => "procedure",
            TariffCategory::Consultation => "consultation",
            TariffCategory::Consumable => "consumable",
        }
    }
}

impl fmt::Display for TariffCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TariffCategory {
    type Err = TariffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medicine" => Ok(TariffCategory::Medicine),
            "lab" => Ok(TariffCategory::Lab),
            "procedure" => Ok(TariffCategory::Procedure),
            "consultation" => Ok(TariffCategory::Consultation),
            "consumable" => Ok(TariffCategory::Consumable),
            other => Err(TariffError::InvalidCategory(other.to_string())),
        }
    }
}

/// An entry in the payer's price list
///
/// The code is the entry's identity and never changes. The price is mutable
/// and is always read live when coverage is calculated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffEntry {
    pub id: TariffId,
    /// NHIS tariff code, unique across the master
    pub code: String,
    pub name: String,
    pub category: TariffCategory,
    pub price: Money,
    /// Dispensing unit (tablet, ml, test, ...)
    pub unit: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TariffEntry {
    /// Creates an active tariff entry
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        category: TariffCategory,
        price: Money,
    ) -> Result<Self, TariffError> {
        let code = code.into().trim().to_string();
        if code.is_empty() {
            return Err(TariffError::validation("Tariff code must not be empty"));
        }
        ensure_price(&price)?;

        let now = Utc::now();
        Ok(Self {
            id: TariffId::new_v7(),
            code,
            name: name.into(),
            category,
            price,
            unit: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Replaces the price
    pub fn update_price(&mut self, price: Money) -> Result<(), TariffError> {
        ensure_price(&price)?;
        self.price = price;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Applies the mutable fields of an import row, keeping the identity
    pub fn apply_update(
        &mut self,
        name: impl Into<String>,
        category: TariffCategory,
        price: Money,
        unit: Option<String>,
    ) -> Result<(), TariffError> {
        self.update_price(price)?;
        self.name = name.into();
        self.category = category;
        self.unit = unit;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

/// A Ghana Diagnosis-Related Group base tariff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdrgTariff {
    pub id: GdrgTariffId,
    pub code: String,
    pub name: String,
    /// Major diagnostic category (e.g. "Out Patient", "Obstetrics")
    pub mdc_category: String,
    /// "adult", "child" or "all"
    pub age_category: String,
    pub tariff_price: Money,
    pub is_active: bool,
}

impl GdrgTariff {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        mdc_category: impl Into<String>,
        tariff_price: Money,
    ) -> Result<Self, TariffError> {
        let code = code.into().trim().to_string();
        if code.is_empty() {
            return Err(TariffError::validation("G-DRG code must not be empty"));
        }
        ensure_price(&tariff_price)?;

        Ok(Self {
            id: GdrgTariffId::new_v7(),
            code,
            name: name.into(),
            mdc_category: mdc_category.into(),
            age_category: "all".to_string(),
            tariff_price,
            is_active: true,
        })
    }

    pub fn with_age_category(mut self, age_category: impl Into<String>) -> Self {
        self.age_category = age_category.into();
        self
    }

    /// Label used in pickers, e.g. "Malaria (OPDC06A)"
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}

fn ensure_price(price: &Money) -> Result<(), TariffError> {
    if price.is_negative() {
        return Err(TariffError::validation(format!(
            "Price must not be negative, got {}",
            price
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_category_parsing_is_case_insensitive() {
        assert_eq!("LAB".parse::<TariffCategory>().unwrap(), TariffCategory::Lab);
        assert_eq!(" Medicine ".parse::<TariffCategory>().unwrap(), TariffCategory::Medicine);
        assert!("surgery".parse::<TariffCategory>().is_err());
    }

    #[test]
    fn test_update_price_keeps_identity() {
        let mut entry = TariffEntry::new("AMOXYCAP1", "Amoxicillin 250mg", TariffCategory::Medicine, Money::ghs(dec!(0.50))).unwrap();
        let id = entry.id;

        entry.update_price(Money::ghs(dec!(0.75))).unwrap();

        assert_eq!(entry.id, id);
        assert_eq!(entry.code, "AMOXYCAP1");
        assert_eq!(entry.price.amount(), dec!(0.75));
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = TariffEntry::new("X", "X", TariffCategory::Lab, Money::ghs(dec!(-1)));
        assert!(matches!(result, Err(TariffError::Validation(_))));
    }
}
