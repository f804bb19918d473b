//! In-memory store
//!
//! One `tokio::sync::RwLock` guards every table, so a write (including a
//! whole [`domain_claims::BatchCommit`]) is seen by readers entirely or not
//! at all.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use core_kernel::DomainPort;
use domain_claims::{Claim, ClaimBatch};
use domain_tariff::HospitalItem;

use crate::tables::Tables;

/// Shared handle to the store; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads hospital catalogue items, replacing any with the same key
    ///
    /// The catalogue belongs to the hospital's own systems, so there is no
    /// port for writing it.
    pub async fn insert_items(&self, items: impl IntoIterator<Item = HospitalItem>) {
        let mut tables = self.write().await;
        for item in items {
            tables.items.insert(item.key, item);
        }
        debug!(items = tables.items.len(), "Hospital catalogue loaded");
    }

    /// Loads batches and claims exactly as they were saved elsewhere,
    /// versions included
    pub async fn restore(&self, batches: impl IntoIterator<Item = ClaimBatch>, claims: impl IntoIterator<Item = Claim>) {
        let mut tables = self.write().await;
        for claim in claims {
            tables.claim_codes.insert(claim.claim_check_code.clone(), claim.id);
            tables.claims.insert(claim.id, claim);
        }
        for batch in batches {
            tables.batch_numbers.insert(batch.batch_number.clone(), batch.id);
            tables.batches.insert(batch.id, batch);
        }
        debug!(claims = tables.claims.len(), batches = tables.batches.len(), "Snapshot restored");
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}

impl DomainPort for InMemoryStore {}
