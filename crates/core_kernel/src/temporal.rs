//! Effective periods for date-bounded master data
//!
//! Coverage rules carry an optional `effective_from` / `effective_to` pair.
//! Both bounds are inclusive calendar dates and either may be open.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },
}

/// An inclusive date range with optional open ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EffectivePeriod {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl EffectivePeriod {
    /// Creates a period, rejecting a start that falls after the end
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, TemporalError> {
        if let (Some(start), Some(end)) = (from, to) {
            if start > end {
                return Err(TemporalError::InvalidPeriod {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(Self { from, to })
    }

    /// A period with no bounds at all
    pub fn always() -> Self {
        Self::default()
    }

    /// A period that starts on `from` and never ends
    pub fn starting(from: NaiveDate) -> Self {
        Self { from: Some(from), to: None }
    }

    /// Returns true if the date falls within the period
    pub fn contains(&self, date: NaiveDate) -> bool {
        let after_start = self.from.map_or(true, |from| date >= from);
        let before_end = self.to.map_or(true, |to| date <= to);
        after_start && before_end
    }

    pub fn is_unbounded(&self) -> bool {
        self.to.is_none()
    }
}
