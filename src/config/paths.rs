//! Path management for envelope-plan
//!
//! Provides XDG-compliant path resolution for configuration, the audit log and
//! the per-table data files.
//!
//! ## Path Resolution Order
//!
//! 1. `ENVELOPE_PLAN_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/envelope-plan` or `~/.config/envelope-plan`
//! 3. Windows: `%APPDATA%\envelope-plan`

use std::path::PathBuf;

use crate::error::PlanError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "ENVELOPE_PLAN_DATA_DIR";

const APP_DIR: &str = "envelope-plan";

/// Manages all paths used by envelope-plan
#[derive(Debug, Clone)]
pub struct PlanPaths {
    /// Base directory for all envelope-plan data
    base_dir: PathBuf,
}

impl PlanPaths {
    /// Create a new PlanPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home/config directory can be determined.
    pub fn new() -> Result<Self, PlanError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create PlanPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn accounts_file(&self) -> PathBuf {
        self.data_dir().join("accounts.json")
    }

    /// Categories and their subcategories share one file
    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn monthly_budgets_file(&self) -> PathBuf {
        self.data_dir().join("monthly_budgets.json")
    }

    pub fn goals_file(&self) -> PathBuf {
        self.data_dir().join("goals.json")
    }

    pub fn payees_file(&self) -> PathBuf {
        self.data_dir().join("payees.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), PlanError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| PlanError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| PlanError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if envelope-plan has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default base directory for the current platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, PlanError> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Ok(PathBuf::from(xdg).join(APP_DIR));
        }
    }

    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| PlanError::Config("Could not determine home directory".into()))?;
    Ok(dirs.home_dir().join(".config").join(APP_DIR))
}

/// Resolve the default base directory for the current platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, PlanError> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| PlanError::Config("Could not determine APPDATA directory".into()))?;
    Ok(dirs.config_dir().join(APP_DIR))
}
