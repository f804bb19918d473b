//! Search queries for tariff and G-DRG autocomplete

use serde::{Deserialize, Serialize};

use crate::tariff::{GdrgTariff, TariffCategory, TariffEntry};

/// Result limit used when a query does not set one
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Query parameters for searching the Tariff Master
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TariffQuery {
    /// Case-insensitive substring over code, name and category
    pub search: Option<String>,
    pub category: Option<TariffCategory>,
    pub active_only: bool,
    pub limit: Option<usize>,
}

impl TariffQuery {
    /// Creates a query for active entries matching a search term
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            active_only: true,
            ..Default::default()
        }
    }

    pub fn in_category(mut self, category: TariffCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn include_inactive(mut self) -> Self {
        self.active_only = false;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }

    /// Returns true if the entry satisfies every filter of this query
    pub fn matches(&self, entry: &TariffEntry) -> bool {
        if self.active_only && !entry.is_active {
            return false;
        }
        if let Some(category) = self.category {
            if entry.category != category {
                return false;
            }
        }
        match normalized(&self.search) {
            Some(needle) => {
                contains_ci(&entry.code, &needle)
                    || contains_ci(&entry.name, &needle)
                    || contains_ci(entry.category.as_str(), &needle)
            }
            None => true,
        }
    }

    /// Filters, orders by name and truncates a set of entries
    pub fn apply<'a, I>(&self, entries: I) -> Vec<TariffEntry>
    where
        I: IntoIterator<Item = &'a TariffEntry>,
    {
        let mut results: Vec<TariffEntry> = entries
            .into_iter()
            .filter(|entry| self.matches(entry))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then_with(|| a.code.cmp(&b.code)));
        results.truncate(self.effective_limit());
        results
    }
}

/// Query parameters for searching G-DRG tariffs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GdrgQuery {
    pub search: Option<String>,
    pub mdc_category: Option<String>,
    pub age_category: Option<String>,
    pub active_only: bool,
    pub limit: Option<usize>,
}

impl GdrgQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            active_only: true,
            ..Default::default()
        }
    }

    pub fn in_mdc(mut self, mdc_category: impl Into<String>) -> Self {
        self.mdc_category = Some(mdc_category.into());
        self
    }

    pub fn for_age(mut self, age_category: impl Into<String>) -> Self {
        self.age_category = Some(age_category.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }

    pub fn matches(&self, tariff: &GdrgTariff) -> bool {
        if self.active_only && !tariff.is_active {
            return false;
        }
        if let Some(mdc) = &self.mdc_category {
            if !tariff.mdc_category.eq_ignore_ascii_case(mdc) {
                return false;
            }
        }
        if let Some(age) = &self.age_category {
            if !tariff.age_category.eq_ignore_ascii_case(age) {
                return false;
            }
        }
        match normalized(&self.search) {
            Some(needle) => {
                contains_ci(&tariff.code, &needle)
                    || contains_ci(&tariff.name, &needle)
                    || contains_ci(&tariff.mdc_category, &needle)
            }
            None => true,
        }
    }

    pub fn apply<'a, I>(&self, tariffs: I) -> Vec<GdrgTariff>
    where
        I: IntoIterator<Item = &'a GdrgTariff>,
    {
        let mut results: Vec<GdrgTariff> = tariffs
            .into_iter()
            .filter(|tariff| self.matches(tariff))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then_with(|| a.code.cmp(&b.code)));
        results.truncate(self.effective_limit());
        results
    }
}

fn normalized(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}
