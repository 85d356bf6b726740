use std::collections::HashSet;

use crate::classify::CategoryMap;
use crate::config::ConfigError;
use crate::extract::{ExtractionPattern, PatternError};

/// Everything needed to read one retailer's receipt format.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    name: String,
    detection_string: Option<String>,
    categories: CategoryMap,
    patterns: Vec<ExtractionPattern>,
    start_marker: Option<String>,
    end_marker: Option<String>,
}

impl StoreConfig {
    pub fn new(name: impl Into<String>, patterns: Vec<ExtractionPattern>) -> Self {
        Self {
            name: name.into(),
            detection_string: None,
            categories: CategoryMap::new(),
            patterns,
            start_marker: None,
            end_marker: None,
        }
    }

    /// Compile `patterns` in order.
    pub fn from_patterns<S: AsRef<str>>(
        name: impl Into<String>,
        patterns: &[S],
    ) -> Result<Self, PatternError> {
        let compiled = patterns
            .iter()
            .map(|p| ExtractionPattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, compiled))
    }

    /// An empty detection string falls back to the store name.
    pub fn with_detection_string(mut self, detection: impl Into<String>) -> Self {
        let detection = detection.into();
        self.detection_string = (!detection.trim().is_empty()).then_some(detection);
        self
    }

    pub fn with_categories(mut self, categories: CategoryMap) -> Self {
        self.categories = categories;
        self
    }

    /// Restrict extraction to the text between the first `start` and the
    /// following `end`.
    pub fn with_markers(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start_marker = start.filter(|s| !s.is_empty());
        self.end_marker = end.filter(|s| !s.is_empty());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn detection_string(&self) -> Option<&str> {
        self.detection_string.as_deref()
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn patterns(&self) -> &[ExtractionPattern] {
        &self.patterns
    }

    /// Text searched for when detecting this store.
    pub fn detection_needle(&self) -> &str {
        self.detection_string.as_deref().unwrap_or(&self.name)
    }

    /// Case-insensitive match against an already lowercased receipt.
    fn matches_lowercase(&self, text_lower: &str) -> bool {
        text_lower.contains(&self.detection_needle().to_lowercase())
    }

    /// The slice of `text` this store's patterns should see. Without markers
    /// the whole text is returned; a marker that is not found leaves that end
    /// of the text untouched.
    pub fn item_section<'t>(&self, text: &'t str) -> &'t str {
        let start = self
            .start_marker
            .as_deref()
            .and_then(|m| text.find(m).map(|i| i + m.len()))
            .unwrap_or(0);
        let end = self
            .end_marker
            .as_deref()
            .and_then(|m| text[start..].find(m).map(|i| start + i))
            .unwrap_or(text.len());
        text[start..end].trim()
    }
}

/// An ordered list of store configurations. Earlier entries win detection.
#[derive(Debug, Clone, Default)]
pub struct StoreRegistry {
    stores: Vec<StoreConfig>,
}

impl StoreRegistry {
    pub fn new(stores: Vec<StoreConfig>) -> Result<Self, ConfigError> {
        {
            let mut seen = HashSet::new();
            for store in &stores {
                if store.name.trim().is_empty() {
                    return Err(ConfigError::EmptyStoreName);
                }
                if !seen.insert(store.name.as_str()) {
                    return Err(ConfigError::DuplicateStore(store.name.clone()));
                }
                if store.patterns.is_empty() {
                    return Err(ConfigError::NoPatterns(store.name.clone()));
                }
            }
        }
        Ok(Self { stores })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoreConfig> {
        self.stores.iter()
    }

    pub fn get(&self, name: &str) -> Option<&StoreConfig> {
        self.stores.iter().find(|s| s.name == name)
    }

    pub fn detect(&self, text: &str) -> Option<&StoreConfig> {
        detect_store(text, self)
    }
}

/// First store whose detection string (or name) occurs anywhere in `text`,
/// ignoring case.
pub fn detect_store<'r>(text: &str, registry: &'r StoreRegistry) -> Option<&'r StoreConfig> {
    let lower = text.to_lowercase();
    let found = registry.stores.iter().find(|s| s.matches_lowercase(&lower));
    match found {
        Some(store) => tracing::info!(store = store.name(), "detected store"),
        None => tracing::debug!(stores = registry.len(), "no store detected"),
    }
    found
}
