use serde::{Deserialize, Serialize};
use shelfscan_core::{normalize_receipt_barcode, ProductRecord};

use crate::catalog::{Catalog, CatalogError, CatalogItem, NewItem};

/// An extracted product annotated with its catalog status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewedProduct {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub catalog_id: Option<i64>,
}

impl ReviewedProduct {
    pub fn in_catalog(&self) -> bool {
        self.catalog_id.is_some()
    }
}

/// Look every product up by its normalized barcode. Products without a
/// barcode are never looked up and come back as not in the catalog.
pub fn review_products<C: Catalog + ?Sized>(
    products: Vec<ProductRecord>,
    catalog: &C,
) -> Result<Vec<ReviewedProduct>, CatalogError> {
    products
        .into_iter()
        .map(|mut product| {
            if !product.has_barcode() {
                return Ok(ReviewedProduct { product, catalog_id: None });
            }
            product.barcode = normalize_receipt_barcode(&product.barcode);
            let found = catalog.find_by_barcode(&product.barcode)?;
            tracing::debug!(barcode = %product.barcode, found = found.is_some(), "catalog lookup");
            Ok(ReviewedProduct { catalog_id: found.map(|item| item.id), product })
        })
        .collect()
}

/// Create catalog items for every reviewed product not yet present and link
/// them. A barcode repeated on the same receipt links to the item created for
/// its first occurrence. Returns the newly created items.
pub fn create_missing<C: Catalog + ?Sized>(
    reviewed: &mut [ReviewedProduct],
    catalog: &C,
) -> Result<Vec<CatalogItem>, CatalogError> {
    let mut created = Vec::new();
    for entry in reviewed.iter_mut().filter(|r| !r.in_catalog()) {
        let item = NewItem::from_product(&entry.product);
        if let Some(existing) = catalog.find_by_barcode(&item.barcode)? {
            entry.catalog_id = Some(existing.id);
            continue;
        }
        let new = catalog.create(item)?;
        entry.catalog_id = Some(new.id);
        created.push(new);
    }
    tracing::info!(created = created.len(), "created missing catalog items");
    Ok(created)
}
