use serde::{Deserialize, Serialize};

use crate::Money;

/// One purchased item read off a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub price: Money,
    /// Empty when the receipt line carried no code.
    pub barcode: String,
    /// Department header in effect when the line was read.
    pub category: Option<String>,
    pub store: String,
}

impl ProductRecord {
    pub fn has_barcode(&self) -> bool {
        !self.barcode.is_empty()
    }
}
