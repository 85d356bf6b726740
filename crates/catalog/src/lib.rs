pub mod catalog;
pub mod memory;
pub mod review;

pub use catalog::{Catalog, CatalogError, CatalogItem, NewItem};
pub use memory::MemoryCatalog;
pub use review::{create_missing, review_products, ReviewedProduct};
