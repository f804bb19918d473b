//! Tariff domain services
//!
//! Orchestrates the Tariff Master, G-DRG tariffs, mappings and the hospital
//! item catalogue through their ports.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use validator::Validate;

use core_kernel::{Currency, MappingId, Money, PortError, TariffId};

use crate::error::TariffError;
use crate::import::{ImportSummary, MappingImportRow, RowError, TariffImportRow};
use crate::mapping::{HospitalItem, ItemKey, ItemMapping, ItemType};
use crate::ports::{GdrgPort, HospitalItemPort, MappingPort, TariffPort};
use crate::query::{GdrgQuery, TariffQuery};
use crate::tariff::{GdrgTariff, TariffCategory, TariffEntry};

/// Upper bound on rows returned by the unmapped-items listing
const UNMAPPED_LISTING_LIMIT: usize = 100;

/// Service for the Tariff Master and item mappings
///
/// Imports are best-effort: a bad row is reported in the [`ImportSummary`]
/// and the remaining rows still go through.
#[derive(Clone)]
pub struct TariffService {
    tariffs: Arc<dyn TariffPort>,
    gdrg: Arc<dyn GdrgPort>,
    mappings: Arc<dyn MappingPort>,
    items: Arc<dyn HospitalItemPort>,
    currency: Currency,
}

impl TariffService {
    pub fn new(
        tariffs: Arc<dyn TariffPort>,
        gdrg: Arc<dyn GdrgPort>,
        mappings: Arc<dyn MappingPort>,
        items: Arc<dyn HospitalItemPort>,
    ) -> Self {
        Self {
            tariffs,
            gdrg,
            mappings,
            items,
            currency: Currency::GHS,
        }
    }

    /// Upserts tariff entries by code
    ///
    /// An existing code has its name, category, price and unit replaced. An
    /// unseen code is inserted. A code repeated later in the same import
    /// updates the entry inserted earlier, so no code is ever duplicated.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn import_tariffs(&self, rows: Vec<TariffImportRow>) -> Result<ImportSummary, TariffError> {
        let mut summary = ImportSummary::default();

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 2;

            if let Err(errors) = row.validate() {
                summary.errors.push(RowError::new(row_number, errors.to_string()));
                continue;
            }

            let category: TariffCategory = match row.category.parse() {
                Ok(category) => category,
                Err(err) => {
                    summary.errors.push(RowError::new(row_number, err.to_string()));
                    continue;
                }
            };

            let code = row.code.trim();
            let price = Money::new(row.price, self.currency);

            let (entry, is_update) = match self.tariffs.find_tariff_by_code(code).await? {
                Some(mut existing) => match existing.apply_update(row.name, category, price, row.unit) {
                    Ok(()) => (existing, true),
                    Err(err) => {
                        summary.errors.push(RowError::new(row_number, err.to_string()));
                        continue;
                    }
                },
                None => match TariffEntry::new(code, row.name, category, price) {
                    Ok(mut entry) => {
                        entry.unit = row.unit;
                        (entry, false)
                    }
                    Err(err) => {
                        summary.errors.push(RowError::new(row_number, err.to_string()));
                        continue;
                    }
                },
            };

            if self.save_row(&entry, row_number, &mut summary).await? {
                if is_update {
                    summary.updated += 1;
                } else {
                    summary.imported += 1;
                }
            }
        }

        info!(
            imported = summary.imported,
            updated = summary.updated,
            skipped = summary.skipped(),
            "Tariff import finished"
        );
        Ok(summary)
    }

    /// Upserts item mappings by `(item_type, item_id)`
    ///
    /// The item is resolved by its hospital code and the tariff by its NHIS
    /// code. Either lookup failing rejects the row.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn import_mappings(&self, rows: Vec<MappingImportRow>) -> Result<ImportSummary, TariffError> {
        let mut summary = ImportSummary::default();

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 2;

            if let Err(errors) = row.validate() {
                summary.errors.push(RowError::new(row_number, errors.to_string()));
                continue;
            }

            let item_type: ItemType = match row.item_type.parse() {
                Ok(item_type) => item_type,
                Err(err) => {
                    summary.errors.push(RowError::new(row_number, err.to_string()));
                    continue;
                }
            };

            let Some(item) = self.items.find_item_by_code(item_type, &row.item_code).await? else {
                summary.errors.push(RowError::new(
                    row_number,
                    format!("Item not found with code '{}'", row.item_code),
                ));
                continue;
            };

            let Some(tariff) = self.tariffs.find_tariff_by_code(&row.nhis_code).await? else {
                summary.errors.push(RowError::new(
                    row_number,
                    format!("NHIS tariff not found with code '{}'", row.nhis_code),
                ));
                continue;
            };

            let (mapping, is_update) = match self.mappings.find_mapping(item.key).await? {
                Some(mut mapping) => {
                    mapping.retarget(&row.item_code, tariff.id);
                    (mapping, true)
                }
                None => (ItemMapping::new(item.key, &row.item_code, tariff.id), false),
            };

            match self.mappings.save_mapping(&mapping).await {
                Ok(()) if is_update => summary.updated += 1,
                Ok(()) => summary.imported += 1,
                Err(err @ (PortError::Duplicate { .. } | PortError::NotFound { .. } | PortError::Validation { .. })) => {
                    warn!(row = row_number, item = %item.key, "Mapping row rejected by storage");
                    summary.errors.push(RowError::new(row_number, err.to_string()));
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(
            imported = summary.imported,
            updated = summary.updated,
            skipped = summary.skipped(),
            "Mapping import finished"
        );
        Ok(summary)
    }

    /// Creates a single mapping, rejecting an item that is already mapped
    #[instrument(skip(self))]
    pub async fn create_mapping(&self, key: ItemKey, tariff_id: TariffId) -> Result<ItemMapping, TariffError> {
        if self.mappings.find_mapping(key).await?.is_some() {
            return Err(TariffError::AlreadyMapped(key.to_string()));
        }

        let item = self.items.get_item(key).await?;
        let tariff = self.tariffs.get_tariff(tariff_id).await.map_err(|err| match err {
            PortError::NotFound { id, .. } => TariffError::TariffNotFound(id),
            other => other.into(),
        })?;

        let mapping = ItemMapping::new(key, item.code, tariff.id);
        self.mappings.save_mapping(&mapping).await.map_err(|err| match err {
            PortError::Duplicate { key, .. } => TariffError::AlreadyMapped(key),
            other => other.into(),
        })?;

        debug!(item = %key, tariff = %tariff.code, "Created item mapping");
        Ok(mapping)
    }

    #[instrument(skip(self))]
    pub async fn delete_mapping(&self, id: MappingId) -> Result<(), TariffError> {
        self.mappings.delete_mapping(id).await.map_err(|err| match err {
            PortError::NotFound { id, .. } => TariffError::MappingNotFound(id),
            other => other.into(),
        })
    }

    /// Replaces the price of a tariff entry
    ///
    /// Claims already vetted keep the price they froze.
    #[instrument(skip(self))]
    pub async fn update_price(&self, tariff_id: TariffId, price: Money) -> Result<TariffEntry, TariffError> {
        let mut entry = self.tariffs.get_tariff(tariff_id).await?;
        entry.update_price(price)?;
        self.tariffs.save_tariff(&entry).await?;
        info!(code = %entry.code, price = %price, "Tariff price updated");
        Ok(entry)
    }

    pub async fn save_tariff(&self, tariff: &TariffEntry) -> Result<(), TariffError> {
        Ok(self.tariffs.save_tariff(tariff).await?)
    }

    pub async fn save_gdrg(&self, tariff: &GdrgTariff) -> Result<(), TariffError> {
        Ok(self.gdrg.save_gdrg(tariff).await?)
    }

    /// Resolves the tariff entry an item is mapped to
    pub async fn tariff_for_item(&self, key: ItemKey) -> Result<Option<TariffEntry>, TariffError> {
        Ok(self.mappings.tariff_for_item(key).await?)
    }

    pub async fn search_tariffs(&self, query: &TariffQuery) -> Result<Vec<TariffEntry>, TariffError> {
        Ok(self.tariffs.search_tariffs(query).await?)
    }

    pub async fn search_gdrg(&self, query: &GdrgQuery) -> Result<Vec<GdrgTariff>, TariffError> {
        Ok(self.gdrg.search_gdrg(query).await?)
    }

    /// Lists catalogue items of one type that have no mapping yet
    #[instrument(skip(self))]
    pub async fn unmapped_items(&self, item_type: ItemType, search: Option<&str>) -> Result<Vec<HospitalItem>, TariffError> {
        let mapped = self.mappings.mapped_item_ids(item_type).await?;

        let mut items: Vec<HospitalItem> = self
            .items
            .list_items(item_type)
            .await?
            .into_iter()
            .filter(|item| !mapped.contains(&item.key.item_id))
            .filter(|item| search.map_or(true, |term| item.matches(term)))
            .collect();

        items.sort_by(|a, b| a.name.cmp(&b.name));
        items.truncate(UNMAPPED_LISTING_LIMIT);
        Ok(items)
    }

    /// Saves one import row, recording a storage-level uniqueness rejection
    /// as a row error. Returns whether the row was stored.
    async fn save_row(
        &self,
        entry: &TariffEntry,
        row_number: usize,
        summary: &mut ImportSummary,
    ) -> Result<bool, TariffError> {
        match self.tariffs.save_tariff(entry).await {
            Ok(()) => Ok(true),
            Err(err @ PortError::Duplicate { .. }) => {
                warn!(row = row_number, code = %entry.code, "Import row hit unique index");
                summary.errors.push(RowError::new(row_number, err.to_string()));
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}
