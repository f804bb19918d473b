//! Pre-built Test Fixtures
//!
//! Reference data shared by the integration suites. Values mirror a small
//! Ghanaian district hospital: a handful of catalogue items, their NHIS
//! tariffs and one outpatient G-DRG.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money};
use domain_tariff::{GdrgTariff, HospitalItem, ItemKey, ItemType, MappingImportRow, TariffImportRow};
use nhia_export::FacilityInfo;

/// Money fixtures in cedis
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn ghs(amount: Decimal) -> Money {
        Money::new(amount, Currency::GHS)
    }

    pub fn zero() -> Money {
        Money::zero(Currency::GHS)
    }

    /// Hospital price of the reference drug
    pub fn hospital_drug_price() -> Money {
        Money::ghs(dec!(75.00))
    }

    /// NHIS tariff of the reference drug
    pub fn nhis_drug_tariff() -> Money {
        Money::ghs(dec!(45.00))
    }

    /// Fixed copay on the reference drug
    pub fn drug_copay() -> Money {
        Money::ghs(dec!(4.50))
    }
}

pub struct DateFixtures;

impl DateFixtures {
    pub fn attendance() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    pub fn submission_period() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }
}

/// Hospital catalogue, NHIS tariffs and their mappings
pub struct CatalogueFixtures;

impl CatalogueFixtures {
    pub const AMOXICILLIN: ItemKey = ItemKey { item_type: ItemType::Drug, item_id: 11 };
    pub const ARTEMETHER: ItemKey = ItemKey { item_type: ItemType::Drug, item_id: 12 };
    pub const PARACETAMOL: ItemKey = ItemKey { item_type: ItemType::Drug, item_id: 13 };
    pub const MALARIA_RDT: ItemKey = ItemKey { item_type: ItemType::LabService, item_id: 21 };
    pub const FULL_BLOOD_COUNT: ItemKey = ItemKey { item_type: ItemType::LabService, item_id: 22 };
    pub const WOUND_DRESSING: ItemKey = ItemKey { item_type: ItemType::Procedure, item_id: 31 };

    pub fn hospital_items() -> Vec<HospitalItem> {
        vec![
            HospitalItem::new(ItemType::Drug, 11, "DRG-AMOX", "Amoxicillin 500mg"),
            HospitalItem::new(ItemType::Drug, 12, "DRG-ART", "Artemether/Lumefantrine 20/120mg"),
            HospitalItem::new(ItemType::Drug, 13, "DRG-PARA", "Paracetamol 500mg"),
            HospitalItem::new(ItemType::LabService, 21, "LAB-RDT", "Malaria RDT"),
            HospitalItem::new(ItemType::LabService, 22, "LAB-FBC", "Full Blood Count"),
            HospitalItem::new(ItemType::Procedure, 31, "PRC-DRESS", "Wound dressing"),
        ]
    }

    pub fn tariff_rows() -> Vec<TariffImportRow> {
        vec![
            TariffImportRow::new("AMOXYCAP1", "Amoxicillin Capsule 500mg", "medicine", dec!(45.00)),
            TariffImportRow::new("ARTLUMTB1", "Artemether/Lumefantrine Tablet", "medicine", dec!(4.00)),
            TariffImportRow::new("MALRDT01", "Malaria Rapid Diagnostic Test", "lab", dec!(12.00)),
            TariffImportRow::new("DRESS01", "Dressing, simple", "procedure", dec!(18.50)),
        ]
    }

    /// Maps everything except paracetamol and the full blood count
    pub fn mapping_rows() -> Vec<MappingImportRow> {
        vec![
            MappingImportRow::new("drug", "DRG-AMOX", "AMOXYCAP1"),
            MappingImportRow::new("drug", "DRG-ART", "ARTLUMTB1"),
            MappingImportRow::new("lab_service", "LAB-RDT", "MALRDT01"),
            MappingImportRow::new("procedure", "PRC-DRESS", "DRESS01"),
        ]
    }

    pub fn malaria_gdrg() -> GdrgTariff {
        GdrgTariff::new("OPDC06A", "Malaria", "Out Patient", Money::ghs(dec!(25.73)))
            .map(|tariff| tariff.with_age_category("adult"))
            .unwrap()
    }

    pub fn facility() -> FacilityInfo {
        FacilityInfo::new("FAC-0042", "Ridge Community Hospital")
    }
}
