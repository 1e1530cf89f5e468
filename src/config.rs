use crate::error::ConfigError;
use crate::extractor::ExtractionRules;
use crate::report::{ReportStrategy, TemplateLayout};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Constants
pub const MANUAL_FILE: &str = "manual.xlsx";
pub const MASTER_FILE: &str = "inspector_master.xlsx";
pub const PHOTO_DIR: &str = "photos";
pub const CONFIG_FILE: &str = "app_config.json";
pub const OUTPUT_DIR: &str = "reports";

/// Application settings. Every field has a default so a partial JSON file
/// is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub manual_path: PathBuf,
    pub roster_path: PathBuf,
    pub photo_dir: PathBuf,
    pub recipients_path: PathBuf,
    pub output_dir: PathBuf,
    pub strategy: ReportStrategy,
    pub extraction: ExtractionRules,
    pub layout: TemplateLayout,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            manual_path: PathBuf::from(MANUAL_FILE),
            roster_path: PathBuf::from(MASTER_FILE),
            photo_dir: PathBuf::from(PHOTO_DIR),
            recipients_path: PathBuf::from(CONFIG_FILE),
            output_dir: PathBuf::from(OUTPUT_DIR),
            strategy: ReportStrategy::default(),
            extraction: ExtractionRules::default(),
            layout: TemplateLayout::default(),
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Recipients chosen last time, restored on the next start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientConfig {
    #[serde(default)]
    pub selected_emails: Vec<String>,
}

impl RecipientConfig {
    /// Read the saved recipients. A missing or unreadable file means none.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
        {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring recipient config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
