use serde::{Deserialize, Serialize};
use shelfscan_core::{Money, ProductRecord};

/// Fields pulled from a single receipt line, before the pipeline stamps
/// store and category and normalizes the barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLine {
    pub title: String,
    pub price: Money,
    pub barcode: String,
}

/// Which store-processor document a configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKind {
    Custom,
    Default,
}

impl std::fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryKind::Custom => write!(f, "custom"),
            RegistryKind::Default => write!(f, "default"),
        }
    }
}

/// A successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptExtraction {
    pub store: String,
    pub registry: RegistryKind,
    /// Position of the accepted pattern in the store's pattern list.
    pub pattern_index: usize,
    pub products: Vec<ProductRecord>,
}

impl ReceiptExtraction {
    pub fn total(&self) -> Money {
        self.products.iter().map(|p| p.price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, cents: i64) -> ProductRecord {
        ProductRecord {
            name: name.into(),
            price: Money::from_cents(cents),
            barcode: String::new(),
            category: None,
            store: "WinCo".into(),
        }
    }

    #[test]
    fn total_sums_prices() {
        let r = ReceiptExtraction {
            store: "WinCo".into(),
            registry: RegistryKind::Default,
            pattern_index: 0,
            products: vec![record("Milk", 399), record("Eggs", 249)],
        };
        assert_eq!(r.total(), Money::from_cents(648));
    }

    #[test]
    fn registry_kind_display() {
        assert_eq!(RegistryKind::Custom.to_string(), "custom");
        assert_eq!(serde_json::to_string(&RegistryKind::Default).unwrap(), "\"default\"");
    }
}
