//! Store-processor and category-mapping documents.
//!
//! Both documents come in JSON (one array of processors, one object of
//! per-store mappings) or TOML (`[[stores]]` tables, one table per store).
//! The format is picked from the file extension.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::CategoryMap;
use crate::extract::{ExtractionPattern, PatternError};
use crate::store::{StoreConfig, StoreRegistry};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid TOML document: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Store '{store}', pattern #{index}: {source}")]
    Pattern {
        store: String,
        index: usize,
        #[source]
        source: PatternError,
    },
    #[error("Store '{0}' has no patterns")]
    NoPatterns(String),
    #[error("Duplicate store name: '{0}'")]
    DuplicateStore(String),
    #[error("Store name must not be empty")]
    EmptyStoreName,
    #[error("Unsupported document format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("json") => Ok(DocumentFormat::Json),
            Some("toml") => Ok(DocumentFormat::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

fn read_document(path: &Path) -> Result<(String, DocumentFormat), ConfigError> {
    let format = DocumentFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((text, format))
}

// ── Store processors ─────────────────────────────────────────────────────────

/// One entry of a store-processor document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_string: Option<String>,
    /// Candidate patterns, highest priority first.
    pub processors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlProcessors {
    #[serde(default)]
    stores: Vec<ProcessorEntry>,
}

pub fn parse_processors(text: &str, format: DocumentFormat) -> Result<Vec<ProcessorEntry>, ConfigError> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(text)?),
        DocumentFormat::Toml => Ok(toml::from_str::<TomlProcessors>(text)?.stores),
    }
}

pub fn load_processors(path: &Path) -> Result<Vec<ProcessorEntry>, ConfigError> {
    let (text, format) = read_document(path)?;
    parse_processors(&text, format)
}

impl ProcessorEntry {
    /// Compile into a [`StoreConfig`], attaching the store's category mapping.
    pub fn into_store(self, categories: &CategoryMappings) -> Result<StoreConfig, ConfigError> {
        let patterns = self
            .processors
            .iter()
            .enumerate()
            .map(|(index, p)| {
                ExtractionPattern::new(p).map_err(|source| ConfigError::Pattern {
                    store: self.name.clone(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut store = StoreConfig::new(self.name.as_str(), patterns)
            .with_categories(categories.for_store(&self.name))
            .with_markers(self.start_marker, self.end_marker);
        if let Some(detection) = self.detection_string {
            store = store.with_detection_string(detection);
        }
        Ok(store)
    }
}

impl StoreRegistry {
    pub fn from_entries(
        entries: Vec<ProcessorEntry>,
        categories: &CategoryMappings,
    ) -> Result<Self, ConfigError> {
        let stores = entries
            .into_iter()
            .map(|e| e.into_store(categories))
            .collect::<Result<Vec<_>, _>>()?;
        StoreRegistry::new(stores)
    }

    /// Load a store-processor document and attach category mappings.
    pub fn load(path: &Path, categories: &CategoryMappings) -> Result<Self, ConfigError> {
        let registry = Self::from_entries(load_processors(path)?, categories)?;
        tracing::info!(path = %path.display(), stores = registry.len(), "loaded store processors");
        Ok(registry)
    }
}

// ── Category mappings ────────────────────────────────────────────────────────

/// Per-store category mappings, keyed by store name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMappings(HashMap<String, CategoryMap>);

impl CategoryMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping for `store`; empty (no-category mode) when absent.
    pub fn for_store(&self, store: &str) -> CategoryMap {
        self.0.get(store).cloned().unwrap_or_default()
    }

    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, ConfigError> {
        match format {
            DocumentFormat::Json => Ok(serde_json::from_str(text)?),
            DocumentFormat::Toml => Ok(toml::from_str(text)?),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let (text, format) = read_document(path)?;
        Self::parse(&text, format)
    }
}
