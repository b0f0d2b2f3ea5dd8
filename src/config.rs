//! Configuration Management
//!
//! Handles persistent configuration storage for azxray.

use crate::azure::MANAGEMENT_ENDPOINT;
use crate::report::OutputFormat;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// ARM endpoint relative request paths are resolved against
    #[serde(default = "default_endpoint")]
    pub management_endpoint: String,
    /// Output format used when `--format` is not given
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
    /// Print portal links for Resource Graph queries
    #[serde(default)]
    pub portal_links: bool,
}

fn default_endpoint() -> String {
    MANAGEMENT_ENDPOINT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            management_endpoint: default_endpoint(),
            output_format: None,
            portal_links: false,
        }
    }
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("azxray").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective output format (CLI > config > text)
    pub fn effective_format(&self, cli: Option<OutputFormat>) -> OutputFormat {
        cli.or(self.output_format).unwrap_or_default()
    }

    /// Get effective portal link setting (CLI > config)
    pub fn effective_portal_links(&self, cli: Option<bool>) -> bool {
        cli.unwrap_or(self.portal_links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> PathBuf {
        dir.path().join("azxray").join("config.json")
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&config_in(&dir));
        assert_eq!(config, Config::default());
        assert_eq!(config.management_endpoint, MANAGEMENT_ENDPOINT);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = config_in(&dir);
        let config = Config {
            management_endpoint: "https://management.usgovcloudapi.net".to_string(),
            output_format: Some(OutputFormat::Json),
            portal_links: true,
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "portal_links": true }"#).unwrap();

        let config = Config::load_from(&path);
        assert!(config.portal_links);
        assert_eq!(config.management_endpoint, MANAGEMENT_ENDPOINT);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_effective_format_precedence() {
        let config = Config {
            output_format: Some(OutputFormat::Yaml),
            ..Default::default()
        };
        assert_eq!(config.effective_format(Some(OutputFormat::Json)), OutputFormat::Json);
        assert_eq!(config.effective_format(None), OutputFormat::Yaml);
        assert_eq!(Config::default().effective_format(None), OutputFormat::Text);
    }

    #[test]
    fn test_effective_portal_links_precedence() {
        let config = Config {
            portal_links: true,
            ..Default::default()
        };
        assert!(!config.effective_portal_links(Some(false)));
        assert!(config.effective_portal_links(None));
        assert!(Config::default().effective_portal_links(Some(true)));
        assert!(!Config::default().effective_portal_links(None));
    }
}
