//! NHIS Tariff Master
//!
//! This crate holds the payer's reference price list and the links from
//! hospital billable items to it:
//!
//! - [`TariffEntry`]: NHIS price per code and category
//! - [`GdrgTariff`]: flat diagnosis-related-group base tariffs
//! - [`ItemMapping`]: one hospital item (drug, lab service, procedure,
//!   consumable) to exactly one tariff entry
//! - Search over tariffs and G-DRGs for autocomplete
//! - Upsert-by-code imports that report per-row failures
//!
//! Tariff prices are read at calculation time and never copied into
//! mappings. Claims freeze the price they used when they are vetted.

pub mod tariff;
pub mod mapping;
pub mod query;
pub mod import;
pub mod ports;
pub mod services;
pub mod error;

pub use tariff::{TariffEntry, TariffCategory, GdrgTariff};
pub use mapping::{ItemMapping, ItemType, ItemKey, HospitalItem};
pub use query::{TariffQuery, GdrgQuery, DEFAULT_SEARCH_LIMIT};
pub use import::{TariffImportRow, MappingImportRow, ImportSummary, RowError};
pub use ports::{TariffPort, GdrgPort, MappingPort, HospitalItemPort};
pub use services::TariffService;
pub use error::TariffError;
