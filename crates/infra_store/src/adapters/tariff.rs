//! Tariff Master, G-DRG, mapping and hospital catalogue adapters

use async_trait::async_trait;
use tracing::{debug, instrument};

use core_kernel::{GdrgTariffId, MappingId, PortError, TariffId};
use domain_tariff::{
    GdrgPort, GdrgQuery, GdrgTariff, HospitalItem, HospitalItemPort, ItemKey, ItemMapping, ItemType, MappingPort,
    TariffEntry, TariffPort, TariffQuery,
};

use crate::error::StoreError;
use crate::store::InMemoryStore;

#[async_trait]
impl TariffPort for InMemoryStore {
    async fn get_tariff(&self, id: TariffId) -> Result<TariffEntry, PortError> {
        self.read()
            .await
            .tariffs
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("TariffEntry", id).into())
    }

    async fn find_tariff_by_code(&self, code: &str) -> Result<Option<TariffEntry>, PortError> {
        let tables = self.read().await;
        Ok(tables
            .tariff_codes
            .get(code)
            .and_then(|id| tables.tariffs.get(id))
            .cloned())
    }

    #[instrument(skip(self, tariff), fields(code = %tariff.code))]
    async fn save_tariff(&self, tariff: &TariffEntry) -> Result<(), PortError> {
        self.write().await.put_tariff(tariff.clone())?;
        debug!("Tariff entry stored");
        Ok(())
    }

    async fn search_tariffs(&self, query: &TariffQuery) -> Result<Vec<TariffEntry>, PortError> {
        Ok(query.apply(self.read().await.tariffs.values()))
    }
}

#[async_trait]
impl GdrgPort for InMemoryStore {
    async fn get_gdrg(&self, id: GdrgTariffId) -> Result<GdrgTariff, PortError> {
        self.read()
            .await
            .gdrg
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("GdrgTariff", id).into())
    }

    async fn find_gdrg_by_code(&self, code: &str) -> Result<Option<GdrgTariff>, PortError> {
        let tables = self.read().await;
        Ok(tables.gdrg_codes.get(code).and_then(|id| tables.gdrg.get(id)).cloned())
    }

    #[instrument(skip(self, tariff), fields(code = %tariff.code))]
    async fn save_gdrg(&self, tariff: &GdrgTariff) -> Result<(), PortError> {
        self.write().await.put_gdrg(tariff.clone())?;
        Ok(())
    }

    async fn search_gdrg(&self, query: &GdrgQuery) -> Result<Vec<GdrgTariff>, PortError> {
        Ok(query.apply(self.read().await.gdrg.values()))
    }
}

#[async_trait]
impl MappingPort for InMemoryStore {
    async fn find_mapping(&self, key: ItemKey) -> Result<Option<ItemMapping>, PortError> {
        let tables = self.read().await;
        Ok(tables
            .mapping_keys
            .get(&key)
            .and_then(|id| tables.mappings.get(id))
            .cloned())
    }

    #[instrument(skip(self, mapping), fields(item = %mapping.key))]
    async fn save_mapping(&self, mapping: &ItemMapping) -> Result<(), PortError> {
        let mut tables = self.write().await;
        if !tables.tariffs.contains_key(&mapping.tariff_id) {
            return Err(StoreError::not_found("TariffEntry", mapping.tariff_id).into());
        }
        tables.put_mapping(mapping.clone())?;
        debug!("Item mapping stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_mapping(&self, id: MappingId) -> Result<(), PortError> {
        self.write().await.remove_mapping(id)?;
        Ok(())
    }

    async fn tariff_for_item(&self, key: ItemKey) -> Result<Option<TariffEntry>, PortError> {
        let tables = self.read().await;
        Ok(tables
            .mapping_keys
            .get(&key)
            .and_then(|id| tables.mappings.get(id))
            .and_then(|mapping| tables.tariffs.get(&mapping.tariff_id))
            .cloned())
    }

    async fn mapped_item_ids(&self, item_type: ItemType) -> Result<Vec<i64>, PortError> {
        let tables = self.read().await;
        let mut ids: Vec<i64> = tables
            .mapping_keys
            .keys()
            .filter(|key| key.item_type == item_type)
            .map(|key| key.item_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[async_trait]
impl HospitalItemPort for InMemoryStore {
    async fn get_item(&self, key: ItemKey) -> Result<HospitalItem, PortError> {
        self.read()
            .await
            .items
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::not_found("HospitalItem", key).into())
    }

    async fn find_item_by_code(&self, item_type: ItemType, code: &str) -> Result<Option<HospitalItem>, PortError> {
        Ok(self
            .read()
            .await
            .items
            .values()
            .find(|item| item.key.item_type == item_type && item.code == code)
            .cloned())
    }

    async fn list_items(&self, item_type: ItemType) -> Result<Vec<HospitalItem>, PortError> {
        let mut items: Vec<HospitalItem> = self
            .read()
            .await
            .items
            .values()
            .filter(|item| item.key.item_type == item_type)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(items)
    }
}
