//! Test Utilities Crate
//!
//! Shared test infrastructure for the NHIS claims test suite.
//!
//! # Modules
//!
//! - `fixtures`: Fixed reference data (dates, catalogue, tariffs, G-DRG)
//! - `builders`: Builders for claims and claim lines with sensible defaults
//! - `system`: Every service wired to one seeded in-memory store
//! - `assertions`: Assertion helpers for money and claim totals
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod system;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use system::*;
pub use assertions::*;
pub use generators::*;
