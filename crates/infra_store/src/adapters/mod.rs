//! Port implementations for [`crate::InMemoryStore`]
//!
//! Each domain gets its own module; all of them translate
//! [`crate::StoreError`] into `PortError` at the boundary.

pub mod tariff;
pub mod coverage;
pub mod claims;
