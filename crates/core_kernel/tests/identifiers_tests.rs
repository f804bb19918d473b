//! Tests for strongly-typed identifiers

use core_kernel::{BatchId, ClaimId, ClaimItemId, CoverageRuleId, GdrgTariffId, MappingId, PlanId, TariffId};
use uuid::Uuid;

mod display {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert!(ClaimId::new().to_string().starts_with("CLM-"));
        assert!(ClaimItemId::new().to_string().starts_with("CLI-"));
        assert!(BatchId::new().to_string().starts_with("BAT-"));
        assert!(TariffId::new().to_string().starts_with("TRF-"));
        assert!(GdrgTariffId::new().to_string().starts_with("GDRG-"));
        assert!(MappingId::new().to_string().starts_with("MAP-"));
        assert!(CoverageRuleId::new().to_string().starts_with("RULE-"));
        assert!(PlanId::new().to_string().starts_with("PLN-"));
    }

    #[test]
    fn test_prefix_accessor() {
        assert_eq!(ClaimId::prefix(), "CLM");
        assert_eq!(BatchId::prefix(), "BAT");
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_parse_with_prefix() {
        let id = ClaimId::new_v7();
        let parsed: ClaimId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: TariffId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed.as_uuid(), &uuid);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("CLM-not-a-uuid".parse::<ClaimId>().is_err());
    }
}

mod ordering {
    use super::*;

    #[test]
    fn test_v7_ids_sort_by_creation() {
        let first = BatchId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = BatchId::new_v7();
        assert!(first < second);
    }

    #[test]
    fn test_serde_is_transparent() {
        let uuid = Uuid::new_v4();
        let id = MappingId::from(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
