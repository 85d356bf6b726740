use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use shelfscan_core::{normalize_receipt_barcode, ProductRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
    #[error("Catalog rejected item: {0}")]
    Rejected(String),
    #[error("Barcode {0} already belongs to another catalog item")]
    Duplicate(String),
    #[error("Failed to access catalog snapshot {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid catalog snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// A product as the inventory catalog knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub barcodes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

/// Payload for creating a catalog item. The barcode is always normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub barcode: String,
    pub category: Option<String>,
    pub store: String,
}

impl NewItem {
    pub fn from_product(product: &ProductRecord) -> Self {
        Self {
            name: product.name.clone(),
            barcode: normalize_receipt_barcode(&product.barcode),
            category: product.category.clone(),
            store: product.store.clone(),
        }
    }
}

/// The external inventory catalog extracted products are reconciled against.
pub trait Catalog: Send + Sync {
    /// `Ok(None)` when no item carries `barcode`.
    fn find_by_barcode(&self, barcode: &str) -> Result<Option<CatalogItem>, CatalogError>;
    fn create(&self, item: NewItem) -> Result<CatalogItem, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_core::Money;

    #[test]
    fn new_item_normalizes_receipt_barcode() {
        let product = ProductRecord {
            name: "COKE ZERO 12PK".into(),
            price: Money::from_cents(699),
            barcode: "4900002890".into(),
            category: Some("Beverages".into()),
            store: "Safeway".into(),
        };
        let item = NewItem::from_product(&product);
        assert_eq!(item.barcode, "049000028904");
        assert_eq!(item.category.as_deref(), Some("Beverages"));
        assert_eq!(item.store, "Safeway");
    }

    #[test]
    fn snapshot_item_defaults_optional_fields() {
        let item: CatalogItem = serde_json::from_str(r#"{"id": 7, "name": "Milk"}"#).unwrap();
        assert!(item.barcodes.is_empty());
        assert_eq!(item.category, None);
    }
}
