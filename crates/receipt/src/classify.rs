use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lines this short are never treated as department headers.
const MIN_HEADER_CHARS: usize = 4;

/// Header text → category label, in document order.
///
/// Order is part of the contract: prefix matching takes the first entry the
/// line starts with, so `MEAT` listed before `MEAT & SEAFOOD` shadows it for
/// any line that is not an exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    entries: Vec<(String, String)>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, header: impl Into<String>, category: impl Into<String>) {
        let header = header.into();
        let category = category.into();
        match self.entries.iter_mut().find(|(h, _)| *h == header) {
            Some(entry) => entry.1 = category,
            None => self.entries.push((header, category)),
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, c)| c.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(h, c)| (h.as_str(), c.as_str()))
    }

    /// The category a header line switches to, or `None` for ordinary lines.
    /// Exact matches win over prefix matches.
    pub fn header_category(&self, line: &str) -> Option<&str> {
        if line.chars().count() < MIN_HEADER_CHARS {
            return None;
        }
        self.get(line).or_else(|| {
            self.entries
                .iter()
                .find(|(h, _)| line.starts_with(h.as_str()))
                .map(|(_, c)| c.as_str())
        })
    }
}

impl<H: Into<String>, C: Into<String>> FromIterator<(H, C)> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = (H, C)>>(iter: I) -> Self {
        let mut map = CategoryMap::new();
        for (h, c) in iter {
            map.insert(h, c);
        }
        map
    }
}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(h, c)| (h, c)))
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = CategoryMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header text to category label")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CategoryMap, A::Error> {
                let mut map = CategoryMap::new();
                while let Some((header, category)) = access.next_entry::<String, String>()? {
                    map.insert(header, category);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

// ── Per-pass state ───────────────────────────────────────────────────────────

/// Result of feeding one line to a [`CategoryTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Department header; consumed, never offered to a pattern.
    Header,
    /// Candidate product line.
    Item,
}

/// Tracks the current department while walking a receipt top to bottom.
/// With an empty map every line is an item and the category stays `None`.
#[derive(Debug)]
pub struct CategoryTracker<'a> {
    map: &'a CategoryMap,
    current: Option<String>,
}

impl<'a> CategoryTracker<'a> {
    pub fn new(map: &'a CategoryMap) -> Self {
        Self { map, current: None }
    }

    pub fn observe(&mut self, line: &str) -> LineKind {
        if self.map.is_empty() {
            return LineKind::Item;
        }
        match self.map.header_category(line) {
            Some(category) => {
                tracing::debug!(line, category, "category header");
                self.current = Some(category.to_string());
                LineKind::Header
            }
            None => LineKind::Item,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grocery_map() -> CategoryMap {
        [("PRODUCE", "Produce"), ("DAIRY", "Dairy"), ("MEAT", "Meat"), ("MEAT & SEAFOOD", "Seafood")]
            .into_iter()
            .collect()
    }

    #[test]
    fn exact_match_is_header() {
        assert_eq!(grocery_map().header_category("DAIRY"), Some("Dairy"));
    }

    #[test]
    fn exact_match_beats_earlier_prefix() {
        assert_eq!(grocery_map().header_category("MEAT & SEAFOOD"), Some("Seafood"));
    }

    #[test]
    fn prefix_scan_follows_insertion_order() {
        assert_eq!(grocery_map().header_category("MEAT & SEAFOOD DEPT"), Some("Meat"));
    }

    #[test]
    fn short_lines_are_never_headers() {
        let map: CategoryMap = [("BAK", "Bakery")].into_iter().collect();
        assert_eq!(map.header_category("BAK"), None);
    }

    #[test]
    fn product_line_is_not_header() {
        assert_eq!(grocery_map().header_category("Apples    2.99"), None);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = grocery_map();
        map.insert("PRODUCE", "Fruit & Veg");
        assert_eq!(map.len(), 4);
        assert_eq!(map.iter().next(), Some(("PRODUCE", "Fruit & Veg")));
    }

    #[test]
    fn tracker_carries_category_until_next_header() {
        let map = grocery_map();
        let mut tracker = CategoryTracker::new(&map);
        assert_eq!(tracker.observe("Apples 2.99"), LineKind::Item);
        assert_eq!(tracker.current(), None);

        assert_eq!(tracker.observe("PRODUCE"), LineKind::Header);
        tracker.observe("Apples 2.99");
        assert_eq!(tracker.current(), Some("Produce"));
        tracker.observe("Bananas 1.49");
        assert_eq!(tracker.current(), Some("Produce"));

        assert_eq!(tracker.observe("DAIRY"), LineKind::Header);
        tracker.observe("Milk 3.99");
        assert_eq!(tracker.current(), Some("Dairy"));
    }

    #[test]
    fn empty_map_means_no_category_mode() {
        let map = CategoryMap::new();
        let mut tracker = CategoryTracker::new(&map);
        assert_eq!(tracker.observe("PRODUCE"), LineKind::Item);
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn json_order_is_preserved() {
        let map: CategoryMap =
            serde_json::from_str(r#"{"ZEBRA": "z", "APPLE": "a", "MANGO": "m"}"#).unwrap();
        let keys: Vec<&str> = map.iter().map(|(h, _)| h).collect();
        assert_eq!(keys, ["ZEBRA", "APPLE", "MANGO"]);
    }

    #[test]
    fn serializes_back_as_map() {
        let json = serde_json::to_string(&grocery_map()).unwrap();
        assert!(json.starts_with(r#"{"PRODUCE":"Produce","DAIRY":"Dairy""#));
    }
}
