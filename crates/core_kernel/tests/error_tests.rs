//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::temporal::TemporalError;
use core_kernel::PortError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Coverage value must be between 0 and 100");

    match error {
        CoreError::Validation(msg) => assert!(msg.contains("between 0 and 100")),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_invalid_state() {
    let error = CoreError::invalid_state("Cannot transition from draft to paid");

    match error {
        CoreError::InvalidStateTransition(msg) => assert!(msg.contains("Cannot transition")),
        _ => panic!("Expected InvalidStateTransition error"),
    }
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::CurrencyMismatch("GHS".to_string(), "USD".to_string());
    let core_error: CoreError = money_error.into();

    assert!(matches!(core_error, CoreError::Money(_)));
}

#[test]
fn test_core_error_from_temporal_error() {
    let temporal = TemporalError::InvalidPeriod {
        start: "2024-12-31".to_string(),
        end: "2024-01-01".to_string(),
    };
    let core_error: CoreError = temporal.into();

    assert!(core_error.to_string().contains("2024-12-31"));
}

#[test]
fn test_port_error_helpers() {
    assert!(PortError::not_found("Claim", "CLM-1").is_not_found());
    assert!(PortError::duplicate("TariffEntry", "AMOXYCAP1").is_duplicate());
    assert!(PortError::conflict("stale version").is_conflict());

    match PortError::validation_field("must not be empty", "code") {
        PortError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("code")),
        other => panic!("Expected Validation error, got {other:?}"),
    }
}
