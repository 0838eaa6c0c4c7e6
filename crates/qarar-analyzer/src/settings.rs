//! Analyzer settings
//!
//! Settings live in a TOML file, by default `<config dir>/qarar/analyzer.toml`.
//! A missing file means defaults; every key is optional.
//!
//! ```toml
//! debug = true
//! output_dir = "reports"
//!
//! [analyzer]
//! slow_query_threshold = 0.2
//! n_plus_one_threshold = 10
//! ```

use qarar_core::{QararError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::AnalyzerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Query collection is only enabled in debug mode
    pub debug: bool,
    /// Where `file` output writes reports
    pub output_dir: PathBuf,
    pub analyzer: AnalyzerConfig,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            debug: true,
            output_dir: PathBuf::from("."),
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl AnalyzerSettings {
    /// Loads settings from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; the default location may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::settings_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if required {
                return Err(QararError::Configuration(format!(
                    "Settings file not found: {}",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let settings = Self::from_toml(&content).map_err(|e| match e {
            QararError::Configuration(msg) => {
                QararError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        tracing::info!(path = %path.display(), debug = settings.debug, "loaded settings");
        Ok(settings)
    }

    /// Parses settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| QararError::Configuration(e.to_string()))
    }

    /// Serializes settings to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| QararError::Configuration(e.to_string()))
    }

    /// Default settings file location
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qarar").join("analyzer.toml"))
    }
}
