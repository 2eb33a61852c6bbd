//! Session configuration
//!
//! Loaded from a JSON file (camelCase keys); every field has a default so an
//! empty object is a valid configuration.

use crate::error::BrainError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Host suffix mapped to a provider name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRule {
    pub suffix: String,
    pub name: String,
}

impl ProviderRule {
    pub fn new(suffix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            name: name.into(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Configuration for a `BrainSession`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrainConfig {
    /// Site host; defaults to the host of the first exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_host: Option<String>,
    /// Providers consulted after the built-in table
    #[serde(default)]
    pub extra_providers: Vec<ProviderRule>,
    /// Where `profile.v1.json` and `summary.md` are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            origin_host: None,
            extra_providers: Vec::new(),
            output_dir: default_output_dir(),
        }
    }
}

impl BrainConfig {
    /// Parse configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, BrainError> {
        serde_json::from_str(json).map_err(|e| BrainError::Config(e.to_string()))
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, BrainError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_uses_defaults() {
        assert_eq!(BrainConfig::from_json("{}").unwrap(), BrainConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = BrainConfig::from_json(
            r#"{
                "originHost": "example.com",
                "extraProviders": [{"suffix": "intercom.io", "name": "Intercom"}],
                "outputDir": "/tmp/brain"
            }"#,
        )
        .unwrap();

        assert_eq!(config.origin_host.as_deref(), Some("example.com"));
        assert_eq!(config.extra_providers, vec![ProviderRule::new("intercom.io", "Intercom")]);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/brain"));
    }

    #[test]
    fn test_invalid_config() {
        let err = BrainConfig::from_json(r#"{"extraProviders": 3}"#).unwrap_err();
        assert!(matches!(err, BrainError::Config(_)));
    }
}
