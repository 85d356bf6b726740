use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::catalog::{Catalog, CatalogError, CatalogItem, NewItem};

/// In-process catalog backed by a JSON snapshot (an array of items).
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    items: Mutex<Vec<CatalogItem>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        Self { items: Mutex::new(items) }
    }

    pub fn parse_json(text: &str) -> Result<Self, CatalogError> {
        Ok(Self::from_items(serde_json::from_str(text)?))
    }

    pub fn load_json(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        let catalog = Self::parse_json(&text)?;
        tracing::debug!(path = %path.display(), items = catalog.len(), "loaded catalog snapshot");
        Ok(catalog)
    }

    /// Refuses to write while the lock is poisoned; the on-disk snapshot is
    /// left as it was.
    pub fn save_json(&self, path: &Path) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(&*self.lock()?)?;
        std::fs::write(path, json)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })
    }

    /// Snapshot of the current contents, read through a poisoned lock.
    pub fn items(&self) -> Vec<CatalogItem> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<CatalogItem>>, CatalogError> {
        self.items
            .lock()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".into()))
    }
}

impl Catalog for MemoryCatalog {
    fn find_by_barcode(&self, barcode: &str) -> Result<Option<CatalogItem>, CatalogError> {
        if barcode.is_empty() {
            return Ok(None);
        }
        let items = self.lock()?;
        Ok(items.iter().find(|i| i.barcodes.iter().any(|b| b == barcode)).cloned())
    }

    fn create(&self, item: NewItem) -> Result<CatalogItem, CatalogError> {
        let name = item.name.trim();
        if name.is_empty() {
            return Err(CatalogError::Rejected("item name is empty".into()));
        }

        let mut items = self.lock()?;
        if !item.barcode.is_empty() && items.iter().any(|i| i.barcodes.contains(&item.barcode)) {
            return Err(CatalogError::Duplicate(item.barcode));
        }

        let id = items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        let created = CatalogItem {
            id,
            name: name.to_string(),
            barcodes: if item.barcode.is_empty() { Vec::new() } else { vec![item.barcode] },
            category: item.category,
            store: Some(item.store).filter(|s| !s.is_empty()),
        };
        items.push(created.clone());
        tracing::info!(id, name = %created.name, "created catalog item");
        Ok(created)
    }
}
