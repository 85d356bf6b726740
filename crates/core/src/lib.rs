pub mod barcode;
pub mod money;
pub mod product;

pub use barcode::{build_upc_from_receipt, normalize_receipt_barcode, upc_check_digit, BarcodeError};
pub use money::{Money, MoneyError};
pub use product::ProductRecord;
