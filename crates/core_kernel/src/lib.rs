//! Core Kernel - Foundational types for the NHIS claims system
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Money types with precise decimal arithmetic (no floating point)
//! - Effective periods for date-bounded rules
//! - Strongly-typed identifiers
//! - The port error type and marker trait for repository ports

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{EffectivePeriod, TemporalError};
pub use identifiers::{
    ClaimId, ClaimItemId, BatchId, TariffId, GdrgTariffId, MappingId,
    CoverageRuleId, InsuranceTariffId, PlanId, ProviderId, PatientId,
};
pub use ports::{PortError, DomainPort};
pub use error::CoreError;
