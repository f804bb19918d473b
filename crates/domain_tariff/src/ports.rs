//! Tariff Domain Ports
//!
//! Storage interfaces for the Tariff Master, G-DRG tariffs, item mappings and
//! the hospital item catalogue. Every read returns a fully materialised
//! value; there is no lazy relationship loading behind these traits.
//!
//! ```rust,ignore
//! let tariffs: Arc<dyn TariffPort> = Arc::new(InMemoryStore::new());
//! let entry = tariffs.find_tariff_by_code("AMOXYCAP1").await?;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, GdrgTariffId, MappingId, PortError, TariffId};

use crate::mapping::{HospitalItem, ItemKey, ItemMapping, ItemType};
use crate::query::{GdrgQuery, TariffQuery};
use crate::tariff::{GdrgTariff, TariffEntry};

/// Port for the Tariff Master
#[async_trait]
pub trait TariffPort: DomainPort {
    async fn get_tariff(&self, id: TariffId) -> Result<TariffEntry, PortError>;

    async fn find_tariff_by_code(&self, code: &str) -> Result<Option<TariffEntry>, PortError>;

    /// Inserts or replaces an entry by id
    ///
    /// Adapters must reject a second entry with the same code with
    /// [`PortError::Duplicate`].
    async fn save_tariff(&self, tariff: &TariffEntry) -> Result<(), PortError>;

    async fn search_tariffs(&self, query: &TariffQuery) -> Result<Vec<TariffEntry>, PortError>;
}

/// Port for G-DRG tariffs
#[async_trait]
pub trait GdrgPort: DomainPort {
    async fn get_gdrg(&self, id: GdrgTariffId) -> Result<GdrgTariff, PortError>;

    async fn find_gdrg_by_code(&self, code: &str) -> Result<Option<GdrgTariff>, PortError>;

    /// Inserts or replaces a G-DRG tariff; codes are unique
    async fn save_gdrg(&self, tariff: &GdrgTariff) -> Result<(), PortError>;

    async fn search_gdrg(&self, query: &GdrgQuery) -> Result<Vec<GdrgTariff>, PortError>;
}

/// Port for item-to-tariff mappings
#[async_trait]
pub trait MappingPort: DomainPort {
    async fn find_mapping(&self, key: ItemKey) -> Result<Option<ItemMapping>, PortError>;

    /// Inserts or replaces a mapping by id
    ///
    /// Adapters must reject a second mapping for the same [`ItemKey`] with
    /// [`PortError::Duplicate`].
    async fn save_mapping(&self, mapping: &ItemMapping) -> Result<(), PortError>;

    async fn delete_mapping(&self, id: MappingId) -> Result<(), PortError>;

    /// Resolves the tariff entry an item is mapped to, if any
    async fn tariff_for_item(&self, key: ItemKey) -> Result<Option<TariffEntry>, PortError>;

    async fn mapped_item_ids(&self, item_type: ItemType) -> Result<Vec<i64>, PortError>;
}

/// Port for the hospital's own billable item catalogue
#[async_trait]
pub trait HospitalItemPort: DomainPort {
    async fn get_item(&self, key: ItemKey) -> Result<HospitalItem, PortError>;

    async fn find_item_by_code(&self, item_type: ItemType, code: &str) -> Result<Option<HospitalItem>, PortError>;

    async fn list_items(&self, item_type: ItemType) -> Result<Vec<HospitalItem>, PortError>;
}
