//! # lintel-config
//!
//! Layered configuration loading for lintel using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LINTEL_*` prefix, `__` as separator)
//! 2. Project-level `lintel.toml`
//! 3. User-level `~/.config/lintel/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LINTEL_ANALYSIS__FRAMEWORK_DIR` -> `analysis.framework_dir`,
//! `LINTEL_REPORT__VERBOSE` -> `report.verbose`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use lintel_config::LintelConfig;
//!
//! let config = LintelConfig::load_with_dotenv().expect("config");
//! println!("framework dir: {}", config.analysis.framework_dir);
//! ```

mod analysis;
mod error;
mod report;
mod schemas;

pub use analysis::AnalysisConfig;
pub use error::ConfigError;
pub use report::ReportConfig;
pub use schemas::SchemaConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project-local config file.
pub const PROJECT_CONFIG_FILE: &str = "lintel.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LintelConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub schemas: SchemaConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl LintelConfig {
    /// Load configuration for the current directory.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env`
    /// support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer fails to parse or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_for(Path::new("."))
    }

    /// Load configuration whose project layer is `<project_root>/lintel.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer fails to parse or a value is invalid.
    pub fn load_for(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_for(project_root).extract()?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer fails to parse or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_for_with_dotenv(Path::new("."))
    }

    /// [`Self::load_for`] after loading `<project_root>/.env`, or the first
    /// `.env` found from the current directory upwards when the project has
    /// none. A missing `.env` is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer fails to parse or a value is invalid.
    pub fn load_for_with_dotenv(project_root: &Path) -> Result<Self, ConfigError> {
        if dotenvy::from_path(project_root.join(".env")).is_err() {
            let _ = dotenvy::dotenv();
        }
        Self::load_for(project_root)
    }

    /// Figment provider chain rooted at the current directory.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_for(Path::new("."))
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or layer additional
    /// providers on top.
    #[must_use]
    pub fn figment_for(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = project_root.join(PROJECT_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("LINTEL_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lintel").join("config.toml"))
    }
}
