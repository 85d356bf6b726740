//! Receipt barcode reconstruction.
//!
//! Grocery receipts commonly print a 10-digit item code: a UPC-A barcode with
//! the leading number-system digit and the trailing check digit dropped.
//! Catalog lookups need the full 12-digit form.

use thiserror::Error;

const UPC_BASE_LEN: usize = 11;
const RECEIPT_CODE_LEN: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BarcodeError {
    #[error("UPC-A check digit needs an 11-digit base, got '{0}'")]
    InvalidBase(String),
    #[error("Expected a 10-digit numeric receipt code, got '{0}'")]
    InvalidReceiptCode(String),
}

fn all_digits(code: &str, len: usize) -> bool {
    code.len() == len && code.bytes().all(|b| b.is_ascii_digit())
}

/// UPC-A check digit over an 11-digit base: digits at even 0-indexed
/// positions weigh 3, odd positions weigh 1.
pub fn upc_check_digit(base: &str) -> Result<u8, BarcodeError> {
    if !all_digits(base, UPC_BASE_LEN) {
        return Err(BarcodeError::InvalidBase(base.to_string()));
    }
    let total: u32 = base
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 { digit * 3 } else { digit }
        })
        .sum();
    Ok(((10 - total % 10) % 10) as u8)
}

/// Pad a 10-digit receipt code with a leading `0` and append the check digit.
pub fn build_upc_from_receipt(code: &str) -> Result<String, BarcodeError> {
    if !all_digits(code, RECEIPT_CODE_LEN) {
        return Err(BarcodeError::InvalidReceiptCode(code.to_string()));
    }
    let base = format!("0{code}");
    let check = upc_check_digit(&base)?;
    Ok(format!("{base}{check}"))
}

/// Canonical form of a barcode read off a receipt. Only 10-digit numeric
/// codes are rewritten; anything else is returned as-is, so the function is
/// idempotent.
pub fn normalize_receipt_barcode(code: &str) -> String {
    match build_upc_from_receipt(code) {
        Ok(upc) => upc,
        Err(_) => code.to_string(),
    }
}
