//! Comparison settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::CompareError;

/// Knobs of the walker and the leaf comparator.
///
/// Every field has a default, so a settings file only names what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Reference entries whose absolute path starts with this are skipped.
    pub skip_prefix: String,
    /// Dataset attribute holding the provenance class tag.
    pub class_attr: String,
    /// Class tags compared in ULPs.
    pub float_classes: Vec<String>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            skip_prefix: "/#".to_string(),
            class_attr: "MATLAB_class".to_string(),
            float_classes: vec!["single".to_string(), "double".to_string()],
        }
    }
}

impl CompareOptions {
    /// Read options from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CompareError> {
        let options_error = |message: String| CompareError::Options {
            path: path.to_path_buf(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|e| options_error(e.to_string()))?;
        let options = serde_json::from_str(&text).map_err(|e| options_error(e.to_string()))?;
        info!("loaded compare options from {}", path.display());
        Ok(options)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, CompareError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// `<config dir>/nulperr/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nulperr").join("config.json"))
    }

    pub fn is_skipped(&self, path: &str) -> bool {
        !self.skip_prefix.is_empty() && path.starts_with(&self.skip_prefix)
    }

    pub fn is_float_class(&self, class: &str) -> bool {
        self.float_classes.iter().any(|c| c == class)
    }
}
