//! Unit tests for the Money module
//!
//! Tests cover creation, rounding, arithmetic and currency handling.

use core_kernel::{Money, Currency, MoneyError, Rate};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(45.123456789), Currency::GHS);
        assert_eq!(m.amount(), dec!(45.1235));
    }

    #[test]
    fn test_ghs_defaults_currency() {
        assert_eq!(Money::ghs(dec!(1)).currency(), Currency::GHS);
        assert_eq!(Currency::default(), Currency::GHS);
    }

    #[test]
    fn test_non_negative_rejects_negative_amounts() {
        let result = Money::non_negative(dec!(-0.01), Currency::GHS);
        assert!(matches!(result, Err(MoneyError::InvalidAmount(_))));
        assert!(Money::non_negative(dec!(0), Currency::GHS).is_ok());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_add_and_sub() {
        let a = Money::ghs(dec!(200.00));
        let b = Money::ghs(dec!(45.50));
        assert_eq!((a + b).amount(), dec!(245.50));
        assert_eq!((a - b).amount(), dec!(154.50));
    }

    #[test]
    fn test_min_picks_smaller_amount() {
        let cap = Money::ghs(dec!(100));
        let subtotal = Money::ghs(dec!(75));
        assert_eq!(cap.min(subtotal).unwrap(), subtotal);
    }

    #[test]
    fn test_min_rejects_currency_mismatch() {
        let ghs = Money::ghs(dec!(1));
        let usd = Money::new(dec!(1), Currency::USD);
        assert!(ghs.min(usd).is_err());
    }

    #[test]
    fn test_clamp_non_negative() {
        assert!(Money::ghs(dec!(-3)).clamp_non_negative().is_zero());
        assert_eq!(Money::ghs(dec!(3)).clamp_non_negative().amount(), dec!(3));
    }

    #[test]
    fn test_try_sum_detects_mixed_currencies() {
        let values = vec![Money::ghs(dec!(1)), Money::new(dec!(1), Currency::USD)];
        assert!(Money::try_sum(Currency::GHS, &values).is_err());
    }
}

mod display {
    use super::*;

    #[test]
    fn test_display_uses_symbol_and_two_places() {
        assert_eq!(Money::ghs(dec!(45)).to_string(), "GH₵ 45.00");
    }

    #[test]
    fn test_rate_round_trips_percentage() {
        let rate = Rate::from_percentage(dec!(80));
        assert_eq!(rate.as_percentage(), dec!(80));
        assert_eq!(rate.as_decimal(), dec!(0.8));
    }
}
