//! User settings for envelope-plan
//!
//! Persists the local budget owner and display preferences.

use serde::{Deserialize, Serialize};

use super::paths::PlanPaths;
use crate::error::PlanError;
use crate::models::UserId;

/// User settings for envelope-plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Owner of every row the CLI reads and writes
    #[serde(default)]
    pub user_id: UserId,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            user_id: UserId::new(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if the file doesn't exist
    ///
    /// Defaults are not persisted here; the caller decides when to save.
    pub fn load_or_create(paths: &PlanPaths) -> Result<Self, PlanError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| PlanError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| PlanError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &PlanPaths) -> Result<(), PlanError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| PlanError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| PlanError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
