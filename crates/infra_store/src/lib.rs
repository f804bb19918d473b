//! Storage Layer
//!
//! [`InMemoryStore`] implements every domain port. It enforces the same
//! guarantees a relational schema would:
//!
//! - unique tariff codes, G-DRG codes, claim check codes, batch numbers and
//!   one mapping per `(item_type, item_id)`, reported as
//!   `PortError::Duplicate` even when a service-level check was skipped
//! - optimistic versioning of claims: a save or commit carrying a stale
//!   `version` fails with `PortError::Conflict`
//! - all-or-nothing batch commits
//! - an append-only batch status log
//!
//! ```rust,ignore
//! let store = Arc::new(InMemoryStore::new());
//! let claims = ClaimService::new(store.clone(), coverage);
//! ```

pub mod adapters;
pub mod error;
pub mod store;
mod tables;

pub use error::StoreError;
pub use store::InMemoryStore;
