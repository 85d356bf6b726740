use regex::Regex;
use shelfscan_core::{Money, MoneyError};
use thiserror::Error;

use crate::types::ExtractedLine;

/// Shortest product name kept; anything shorter is OCR debris.
pub const MIN_TITLE_CHARS: usize = 3;

const GROUP_BARCODE: &str = "barcode";
const GROUP_TITLE: &str = "title";
const GROUP_PRICE: &str = "price";

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("Pattern '{pattern}' has no '{group}' capture group")]
    MissingGroup { pattern: String, group: &'static str },
}

/// Why a matching line still produced no product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRejection {
    InvalidPrice { raw: String },
    ShortTitle { title: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Product(ExtractedLine),
    /// Not a product line for this pattern.
    NoMatch,
    /// Looked like a product line but failed validation.
    Rejected(LineRejection),
}

/// A compiled candidate pattern with `title` and `price` capture groups and
/// an optional `barcode` group.
#[derive(Debug, Clone)]
pub struct ExtractionPattern {
    regex: Regex,
    has_barcode: bool,
}

impl ExtractionPattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern)?;
        let has_group = |name: &str| regex.capture_names().flatten().any(|n| n == name);
        for group in [GROUP_TITLE, GROUP_PRICE] {
            if !has_group(group) {
                return Err(PatternError::MissingGroup { pattern: pattern.to_string(), group });
            }
        }
        let has_barcode = has_group(GROUP_BARCODE);
        Ok(Self { regex, has_barcode })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn has_barcode(&self) -> bool {
        self.has_barcode
    }

    /// Apply the pattern to one (already classified, non-header) line.
    pub fn extract_line(&self, line: &str) -> LineOutcome {
        let Some(caps) = self.regex.captures(line) else {
            return LineOutcome::NoMatch;
        };
        let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());

        let raw_price = group(GROUP_PRICE);
        let price = match Money::parse_price(raw_price) {
            Ok(price) => price,
            Err(MoneyError::Invalid(_) | MoneyError::Negative(_)) => {
                tracing::debug!(line, price = raw_price, "invalid price");
                return LineOutcome::Rejected(LineRejection::InvalidPrice { raw: raw_price.to_string() });
            }
        };

        let title = group(GROUP_TITLE).trim();
        if title.chars().count() < MIN_TITLE_CHARS {
            tracing::debug!(line, title, "title too short");
            return LineOutcome::Rejected(LineRejection::ShortTitle { title: title.to_string() });
        }

        LineOutcome::Product(ExtractedLine {
            title: title.to_string(),
            price,
            barcode: group(GROUP_BARCODE).to_string(),
        })
    }
}
