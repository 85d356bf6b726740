use shelfscan_core::{normalize_receipt_barcode, ProductRecord};
use thiserror::Error;

use crate::classify::{CategoryTracker, LineKind};
use crate::extract::{ExtractionPattern, LineOutcome};
use crate::normalize;
use crate::store::{StoreConfig, StoreRegistry};
use crate::types::{ReceiptExtraction, RegistryKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// Every detected store's patterns came up empty, or no store matched.
    /// Distinct from a receipt that legitimately lists nothing.
    #[error("No parser could extract products from this receipt")]
    Unparseable {
        /// `<registry>:<store>` for each store that was detected and tried.
        tried: Vec<String>,
    },
}

/// Orchestrates: normalize → detect (custom) → extract → detect (default) → extract.
///
/// Registries are fixed at construction; the pipeline holds no per-receipt
/// state and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct ExtractionPipeline {
    custom: StoreRegistry,
    default: StoreRegistry,
}

impl ExtractionPipeline {
    pub fn new(custom: StoreRegistry, default: StoreRegistry) -> Self {
        Self { custom, default }
    }

    pub fn custom(&self) -> &StoreRegistry {
        &self.custom
    }

    pub fn default_registry(&self) -> &StoreRegistry {
        &self.default
    }

    /// Registries in the order they are consulted.
    pub fn registries(&self) -> [(RegistryKind, &StoreRegistry); 2] {
        [(RegistryKind::Custom, &self.custom), (RegistryKind::Default, &self.default)]
    }

    /// Turn raw OCR text into products.
    pub fn extract(&self, raw_text: &str) -> Result<ReceiptExtraction, ExtractionError> {
        let text = normalize::normalize(raw_text);
        let mut tried = Vec::new();

        for (kind, registry) in self.registries() {
            let Some(store) = registry.detect(&text) else {
                continue;
            };
            tried.push(format!("{kind}:{}", store.name()));

            if let Some((pattern_index, products)) = extract_with_store(&text, store) {
                tracing::info!(
                    registry = %kind,
                    store = store.name(),
                    pattern_index,
                    products = products.len(),
                    "receipt parsed"
                );
                return Ok(ReceiptExtraction {
                    store: store.name().to_string(),
                    registry: kind,
                    pattern_index,
                    products,
                });
            }
            tracing::debug!(registry = %kind, store = store.name(), "no pattern produced products");
        }

        tracing::warn!(?tried, "no parser could extract products from this receipt");
        Err(ExtractionError::Unparseable { tried })
    }
}

/// Try `store`'s patterns in priority order over normalized text. The first
/// pattern that yields at least one product wins; results from different
/// patterns are never combined.
pub fn extract_with_store(text: &str, store: &StoreConfig) -> Option<(usize, Vec<ProductRecord>)> {
    let section = store.item_section(text);
    store
        .patterns()
        .iter()
        .enumerate()
        .find_map(|(index, pattern)| {
            let products = extract_products(section, pattern, store);
            tracing::debug!(store = store.name(), index, products = products.len(), "pattern attempt");
            (!products.is_empty()).then_some((index, products))
        })
}

/// One pass of `pattern` over every line. Category headers are tracked and
/// consumed when the store has a mapping; otherwise every line is a
/// candidate.
pub fn extract_products(
    text: &str,
    pattern: &ExtractionPattern,
    store: &StoreConfig,
) -> Vec<ProductRecord> {
    let mut tracker = CategoryTracker::new(store.categories());
    let mut products = Vec::new();

    for (line_no, line) in text.split('\n').enumerate() {
        if tracker.observe(line) == LineKind::Header {
            continue;
        }
        match pattern.extract_line(line) {
            LineOutcome::Product(item) => products.push(ProductRecord {
                name: item.title,
                price: item.price,
                barcode: normalize_receipt_barcode(&item.barcode),
                category: tracker.current().map(str::to_string),
                store: store.name().to_string(),
            }),
            LineOutcome::Rejected(reason) => {
                tracing::debug!(line_no, ?reason, "line rejected");
            }
            LineOutcome::NoMatch => {}
        }
    }
    products
}

// ── Tests ─────────────────────────────────────────────────────────────────────
