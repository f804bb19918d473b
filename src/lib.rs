//! NHIS Claims Core
//!
//! Facade over the workspace crates. Applications can depend on this crate
//! alone and reach every bounded context through it.
//!
//! ```text
//! Tariff Master -> Item Mapping -> Coverage -> Claims -> Batches -> NHIA XML
//! ```

pub use core_kernel as kernel;
pub use domain_claims as claims;
pub use domain_coverage as coverage;
pub use domain_tariff as tariff;
pub use infra_store as store;
pub use nhia_export as export;
