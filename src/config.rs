//! Catalog configuration
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. `--config <FILE>` given on the command line
//! 2. `~/.config/coursefs/config.yaml` (platform config dir)
//! 3. Built-in defaults
//!
//! Command-line flags such as `--base-url` are applied on top of whichever
//! source was loaded.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoder::TextPolicy;
use crate::error::{CatalogError, Result};

/// Default upstream catalog endpoint
pub const DEFAULT_BASE_URL: &str = "http://courses.illinois.edu/cisapp/explorer/schedule";

/// Age in seconds after which a driver should refetch a block
pub const DEFAULT_STALE_AFTER_SECONDS: u64 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Root of the catalog XML service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for each upstream request in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Cap on concurrent detail queries; unbounded when absent
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    /// What to do with characters outside the single-byte block encoding
    #[serde(default)]
    pub text_policy: TextPolicy,

    #[serde(default = "default_stale_after")]
    pub stale_after_seconds: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("coursefs/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_stale_after() -> u64 {
    DEFAULT_STALE_AFTER_SECONDS
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            max_in_flight: None,
            text_policy: TextPolicy::default(),
            stale_after_seconds: default_stale_after(),
        }
    }
}

impl CatalogConfig {
    /// Load from an explicit file, else the user config file, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::load_from_path(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific YAML file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = serde_yaml_ng::from_str(&content).map_err(|e| {
            CatalogError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Platform config file location, if a home directory can be determined
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "coursefs")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(CatalogError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(CatalogError::Config(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }

        if self.max_in_flight == Some(0) {
            return Err(CatalogError::Config(
                "max_in_flight must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
