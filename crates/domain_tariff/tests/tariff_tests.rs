//! Tests for domain_tariff value types, search and import rows

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Money, TariffId};
use domain_tariff::{
    GdrgQuery, GdrgTariff, ImportSummary, ItemKey, ItemMapping, ItemType, RowError,
    TariffCategory, TariffEntry, TariffImportRow, TariffQuery,
};
use validator::Validate;

// ============================================================================
// Tariff Entry Tests
// ============================================================================

mod tariff_entry_tests {
    use super::*;

    #[test]
    fn test_new_trims_code_and_is_active() {
        let entry = TariffEntry::new("  MAL-RDT ", "Malaria RDT", TariffCategory::Lab, Money::ghs(dec!(15)))
            .unwrap()
            .with_unit("test");

        assert_eq!(entry.code, "MAL-RDT");
        assert!(entry.is_active);
        assert_eq!(entry.unit.as_deref(), Some("test"));
    }

    #[test]
    fn test_empty_code_rejected() {
        assert!(TariffEntry::new("   ", "Nothing", TariffCategory::Lab, Money::ghs(dec!(1))).is_err());
    }

    #[test]
    fn test_apply_update_replaces_mutable_fields() {
        let mut entry = TariffEntry::new("PROC1", "Incision", TariffCategory::Procedure, Money::ghs(dec!(80))).unwrap();

        entry
            .apply_update("Incision and drainage", TariffCategory::Procedure, Money::ghs(dec!(95)), Some("unit".into()))
            .unwrap();

        assert_eq!(entry.name, "Incision and drainage");
        assert_eq!(entry.price.amount(), dec!(95));
        assert_eq!(entry.code, "PROC1");
    }

    #[test]
    fn test_gdrg_display_name() {
        let gdrg = GdrgTariff::new("OPDC06A", "Malaria", "Out Patient", Money::ghs(dec!(25.73))).unwrap();
        assert_eq!(gdrg.display_name(), "Malaria (OPDC06A)");
        assert_eq!(gdrg.age_category, "all");
    }
}

// ============================================================================
// Mapping Tests
// ============================================================================

mod mapping_tests {
    use super::*;

    #[test]
    fn test_mapping_keeps_key() {
        let key = ItemKey::new(ItemType::Consumable, 88);
        let mapping = ItemMapping::new(key, "GLOVE-M", TariffId::new());

        assert_eq!(mapping.key, key);
        assert_eq!(mapping.item_code, "GLOVE-M");
    }

    #[test]
    fn test_item_type_serializes_snake_case() {
        let json = serde_json::to_string(&ItemType::LabService).unwrap();
        assert_eq!(json, "\"lab_service\"");
    }
}

// ============================================================================
// Search Tests
// ============================================================================

mod search_tests {
    use super::*;

    fn catalogue() -> Vec<TariffEntry> {
        vec![
            TariffEntry::new("AMOXYCAP1", "Amoxicillin 250mg", TariffCategory::Medicine, Money::ghs(dec!(0.50))).unwrap(),
            TariffEntry::new("FBC01", "Full Blood Count", TariffCategory::Lab, Money::ghs(dec!(12))).unwrap(),
            TariffEntry::new("MALRDT", "Malaria RDT", TariffCategory::Lab, Money::ghs(dec!(15))).unwrap(),
        ]
    }

    #[test]
    fn test_category_filter() {
        let results = TariffQuery::default().in_category(TariffCategory::Lab).apply(&catalogue());
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|t| t.category == TariffCategory::Lab));
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let results = TariffQuery::search("   ").apply(&catalogue());
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_gdrg_limit() {
        let tariffs: Vec<GdrgTariff> = (0..10)
            .map(|i| GdrgTariff::new(format!("G{i:02}"), format!("Group {i:02}"), "Medicine", Money::ghs(dec!(10))).unwrap())
            .collect();

        let results = GdrgQuery::search("group").with_limit(4).apply(&tariffs);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].code, "G00");
    }
}

// ============================================================================
// Import Row Tests
// ============================================================================

mod import_tests {
    use super::*;

    #[test]
    fn test_overlong_unit_rejected() {
        let row = TariffImportRow::new("X1", "Thing", "lab", dec!(1)).with_unit("u".repeat(51));
        assert!(row.validate().is_err());
    }

    #[test]
    fn test_clean_summary() {
        let summary = ImportSummary { imported: 3, updated: 0, errors: vec![] };
        assert!(summary.is_clean());
        assert_eq!(summary.message(), "Import completed: 3 created, 0 updated.");
    }

    #[test]
    fn test_row_error_display() {
        assert_eq!(RowError::new(4, "Invalid item type 'ward'").to_string(), "Row 4: Invalid item type 'ward'");
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
        fn search_results_never_exceed_limit(count in 0usize..80, limit in 1usize..60) {
            let entries: Vec<TariffEntry> = (0..count)
                .map(|i| TariffEntry::new(format!("C{i}"), format!("Item {i}"), TariffCategory::Medicine, Money::ghs(Decimal::from(i as u32))).unwrap())
                .collect();

            let results = TariffQuery::default().with_limit(limit).apply(&entries);
            prop_assert!(results.len() <= limit);
            prop_assert_eq!(results.len(), count.min(limit));
        }

        #[test]
        fn search_is_case_insensitive(name in "[A-Za-z]{3,12}") {
            let entry = TariffEntry::new("CODE", name.clone(), TariffCategory::Lab, Money::ghs(dec!(1))).unwrap();
            prop_assert!(TariffQuery::search(name.to_uppercase()).matches(&entry));
            prop_assert!(TariffQuery::search(name.to_lowercase()).matches(&entry));
        }
    }
}
