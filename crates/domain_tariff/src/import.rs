//! Import rows and the per-row import report
//!
//! File parsing happens upstream; these types describe one already-split
//! row each. Row numbers count the header as row 1, so the first data row
//! is row 2.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// One row of a Tariff Master import (`nhis_code,name,category,price,unit`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TariffImportRow {
    #[validate(length(max = 50), custom(function = "validate_present"))]
    pub code: String,
    #[validate(length(max = 255), custom(function = "validate_present"))]
    pub name: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
}

impl TariffImportRow {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            category: category.into(),
            price,
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// One row of an item mapping import (`item_type,item_code,nhis_code`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MappingImportRow {
    #[validate(length(min = 1, message = "item type is required"))]
    pub item_type: String,
    #[validate(custom(function = "validate_present"))]
    pub item_code: String,
    #[validate(custom(function = "validate_present"))]
    pub nhis_code: String,
}

impl MappingImportRow {
    pub fn new(item_type: impl Into<String>, item_code: impl Into<String>, nhis_code: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            item_code: item_code.into(),
            nhis_code: nhis_code.into(),
        }
    }
}

/// Rejects empty and whitespace-only values
fn validate_present(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("value is required".into());
        return Err(error);
    }
    Ok(())
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        let mut error = ValidationError::new("negative_price");
        error.message = Some("price must not be negative".into());
        return Err(error);
    }
    Ok(())
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

/// Outcome of an import: counts plus every rejected row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub updated: usize,
    pub errors: Vec<RowError>,
}

impl ImportSummary {
    pub fn skipped(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Operator-facing summary with at most three error samples
    pub fn message(&self) -> String {
        let mut message = format!(
            "Import completed: {} created, {} updated.",
            self.imported, self.updated
        );
        if !self.errors.is_empty() {
            let samples: Vec<String> = self.errors.iter().take(3).map(ToString::to_string).collect();
            message.push_str(&format!(" Some rows had errors: {}", samples.join("; ")));
            if self.errors.len() > 3 {
                message.push_str(&format!(" and {} more.", self.errors.len() - 3));
            }
        }
        message
    }
}
