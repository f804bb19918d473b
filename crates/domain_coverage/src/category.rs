//! Service categories used to key coverage rules and classify claim items

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoverageError;

/// Category of a billable service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Consultation,
    Drug,
    Lab,
    Procedure,
    Consumable,
    Ward,
    Nursing,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Consultation => "consultation",
            ServiceCategory::Drug => "drug",
            ServiceCategory::Lab => "lab",
            ServiceCategory::Procedure => "procedure",
            ServiceCategory::Consumable => "consumable",
            ServiceCategory::Ward => "ward",
            ServiceCategory::Nursing => "nursing",
        }
    }

    /// Categories whose NHIS price comes from an item mapping and counts
    /// towards the claim's investigations, prescriptions or procedures
    pub fn is_tariff_priced(&self) -> bool {
        matches!(
            self,
            ServiceCategory::Drug | ServiceCategory::Lab | ServiceCategory::Procedure
        )
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "consultation" => Ok(ServiceCategory::Consultation),
            "drug" | "pharmacy" => Ok(ServiceCategory::Drug),
            "lab" | "laboratory" => Ok(ServiceCategory::Lab),
            "procedure" => Ok(ServiceCategory::Procedure),
            "consumable" => Ok(ServiceCategory::Consumable),
            "ward" => Ok(ServiceCategory::Ward),
            "nursing" => Ok(ServiceCategory::Nursing),
            other => Err(CoverageError::InvalidCategory(other.to_string())),
        }
    }
}
