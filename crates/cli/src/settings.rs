use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use shelfscan_receipt::{CategoryMappings, ExtractionPipeline, StoreRegistry};

pub const SETTINGS_FILE: &str = "shelfscan.toml";

/// Where the engine documents live. Relative paths are resolved against the
/// directory of the settings file they were read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub custom_processors: Option<PathBuf>,
    pub default_processors: Option<PathBuf>,
    pub category_mappings: Option<PathBuf>,
}

impl Settings {
    /// `shelfscan.toml` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shelfscan", "Shelfscan")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    pub fn parse(text: &str, base_dir: &Path) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(text).context("Invalid settings file")?;
        Ok(settings.resolved_against(base_dir))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, base_dir).with_context(|| format!("In {}", path.display()))
    }

    /// An explicit path must exist; the platform default is optional.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "using settings file");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Command-line paths replace whatever the settings file said.
    pub fn with_overrides(
        mut self,
        custom: Option<PathBuf>,
        default: Option<PathBuf>,
        categories: Option<PathBuf>,
    ) -> Self {
        self.custom_processors = custom.or(self.custom_processors);
        self.default_processors = default.or(self.default_processors);
        self.category_mappings = categories.or(self.category_mappings);
        self
    }

    pub fn build_pipeline(&self) -> anyhow::Result<ExtractionPipeline> {
        let categories = match &self.category_mappings {
            Some(path) => CategoryMappings::load(path)
                .with_context(|| format!("Loading category mappings {}", path.display()))?,
            None => CategoryMappings::new(),
        };
        let custom = match &self.custom_processors {
            Some(path) => StoreRegistry::load(path, &categories)
                .with_context(|| format!("Loading custom processors {}", path.display()))?,
            None => StoreRegistry::empty(),
        };
        let default_path = self.default_processors.as_deref().ok_or_else(|| {
            anyhow!("No default processors configured; set `default_processors` in {SETTINGS_FILE} or pass --default")
        })?;
        let default = StoreRegistry::load(default_path, &categories)
            .with_context(|| format!("Loading default processors {}", default_path.display()))?;
        Ok(ExtractionPipeline::new(custom, default))
    }

    fn resolved_against(self, base_dir: &Path) -> Self {
        let resolve = |p: Option<PathBuf>| {
            p.map(|p| if p.is_relative() { base_dir.join(p) } else { p })
        };
        Self {
            custom_processors: resolve(self.custom_processors),
            default_processors: resolve(self.default_processors),
            category_mappings: resolve(self.category_mappings),
        }
    }
}
