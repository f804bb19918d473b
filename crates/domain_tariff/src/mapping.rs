//! Item-to-tariff mappings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{MappingId, TariffId};

use crate::error::TariffError;

/// Kind of hospital billable item that can be mapped to a tariff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Drug,
    LabService,
    Procedure,
    Consumable,
}

impl ItemType {
    pub const ALL: [ItemType; 4] = [
        ItemType::Drug,
        ItemType::LabService,
        ItemType::Procedure,
        ItemType::Consumable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Drug => "drug",
            ItemType::LabService => "lab_service",
            ItemType::Procedure => "procedure",
            ItemType::Consumable => "consumable",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = TariffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "drug" => Ok(ItemType::Drug),
            "lab_service" => Ok(ItemType::LabService),
            "procedure" => Ok(ItemType::Procedure),
            "consumable" => Ok(ItemType::Consumable),
            other => Err(TariffError::InvalidItemType(other.to_string())),
        }
    }
}

/// Natural key of a hospital item: its type plus its id in that catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub item_type: ItemType,
    pub item_id: i64,
}

impl ItemKey {
    pub fn new(item_type: ItemType, item_id: i64) -> Self {
        Self { item_type, item_id }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.item_type, self.item_id)
    }
}

/// Links one hospital item to exactly one tariff entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMapping {
    pub id: MappingId,
    pub key: ItemKey,
    /// Hospital code of the item at the time the mapping was made
    pub item_code: String,
    pub tariff_id: TariffId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemMapping {
    pub fn new(key: ItemKey, item_code: impl Into<String>, tariff_id: TariffId) -> Self {
        let now = Utc::now();
        Self {
            id: MappingId::new_v7(),
            key,
            item_code: item_code.into(),
            tariff_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Points the mapping at a different tariff entry
    pub fn retarget(&mut self, item_code: impl Into<String>, tariff_id: TariffId) {
        self.item_code = item_code.into();
        self.tariff_id = tariff_id;
        self.updated_at = Utc::now();
    }
}

/// A billable item from the hospital's own catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalItem {
    pub key: ItemKey,
    pub code: String,
    pub name: String,
}

impl HospitalItem {
    pub fn new(item_type: ItemType, item_id: i64, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: ItemKey::new(item_type, item_id),
            code: code.into(),
            name: name.into(),
        }
    }

    /// Case-insensitive match against name or code
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.code.to_lowercase().contains(&needle)
    }
}
