//! Tests for effective periods

use chrono::NaiveDate;
use core_kernel::{EffectivePeriod, TemporalError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod creation {
    use super::*;

    #[test]
    fn test_new_accepts_single_day_period() {
        let period = EffectivePeriod::new(Some(date(2024, 3, 1)), Some(date(2024, 3, 1))).unwrap();
        assert!(period.contains(date(2024, 3, 1)));
    }

    #[test]
    fn test_new_rejects_inverted_period() {
        let result = EffectivePeriod::new(Some(date(2024, 12, 31)), Some(date(2024, 1, 1)));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_starting_is_unbounded() {
        let period = EffectivePeriod::starting(date(2024, 1, 1));
        assert!(period.is_unbounded());
    }
}

mod containment {
    use super::*;

    #[test]
    fn test_open_start_contains_past_dates() {
        let period = EffectivePeriod::new(None, Some(date(2024, 6, 30))).unwrap();
        assert!(period.contains(date(2000, 1, 1)));
        assert!(!period.contains(date(2024, 7, 1)));
    }

    #[test]
    fn test_open_end_contains_future_dates() {
        let period = EffectivePeriod::starting(date(2024, 1, 1));
        assert!(period.contains(date(2099, 1, 1)));
        assert!(!period.contains(date(2023, 12, 31)));
    }
}
