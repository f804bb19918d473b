//! Insurance Coverage Domain
//!
//! Decides, for one billable line, how much the insurer pays and how much
//! the patient pays.
//!
//! # Strategy selection
//!
//! ```text
//! plan.provider.is_nhis ─┬─ true  ─> NhisCoverageStrategy     (Tariff Master price, fixed copay only)
//!                        └─ false ─> StandardCoverageStrategy (coverage rules: full / percentage / fixed / excluded)
//! ```
//!
//! The strategy is picked once per plan lookup by [`strategy_for`]. Rule
//! resolution is shared: an item-specific rule wins over the category rule,
//! which wins over the plan's category default.

pub mod category;
pub mod plan;
pub mod rule;
pub mod strategy;
pub mod ports;
pub mod services;
pub mod error;

pub use category::ServiceCategory;
pub use plan::{InsurancePlan, InsuranceProvider, InsuranceTariff, CategoryDefaults};
pub use rule::{CoverageRule, CoverageType, RuleType, ResolvedRule};
pub use strategy::{
    CoverageStrategy, NhisCoverageStrategy, StandardCoverageStrategy, strategy_for,
    CoverageRequest, CoverageContext, CoverageResult, CoverageKind,
};
pub use ports::{PlanPort, CoverageRulePort};
pub use services::CoverageService;
pub use error::CoverageError;
