//! Configuration management for scan settings.
//!
//! Stores configuration in JSON format at `~/.portwatch/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::adapters::scanner::DEFAULT_LSOF_PATH;
use crate::error::{Error, Result};

/// Lower bound applied to the refresh interval.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 1;

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Port scan refresh interval in seconds.
    #[serde(default = "default_refresh_interval", rename = "refreshInterval")]
    pub refresh_interval: u64,

    /// Listing program to run for each scan.
    #[serde(default = "default_lsof_path", rename = "lsofPath")]
    pub lsof_path: String,
}

fn default_refresh_interval() -> u64 {
    5
}

fn default_lsof_path() -> String {
    DEFAULT_LSOF_PATH.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            lsof_path: default_lsof_path(),
        }
    }
}

impl Config {
    /// The refresh interval as a duration, never below one second.
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.max(MIN_REFRESH_INTERVAL_SECS))
    }
}

/// Configuration store for managing app settings.
///
/// Handles reading and writing configuration to `~/.portwatch/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.portwatch/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".portwatch").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Get the refresh interval in seconds.
    pub async fn get_refresh_interval(&self) -> Result<u64> {
        Ok(self.load().await?.refresh_interval)
    }

    /// Set the refresh interval in seconds.
    pub async fn set_refresh_interval(&self, interval: u64) -> Result<()> {
        if interval < MIN_REFRESH_INTERVAL_SECS {
            return Err(Error::Config(format!(
                "Refresh interval must be at least {} second",
                MIN_REFRESH_INTERVAL_SECS
            )));
        }
        let mut config = self.load().await?;
        config.refresh_interval = interval;
        self.save(&config).await
    }

    /// Get the listing program path.
    pub async fn get_lsof_path(&self) -> Result<String> {
        Ok(self.load().await?.lsof_path)
    }

    /// Set the listing program path.
    pub async fn set_lsof_path(&self, path: impl Into<String>) -> Result<()> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(Error::Config("lsof path must not be empty".to_string()));
        }
        let mut config = self.load().await?;
        config.lsof_path = path;
        self.save(&config).await
    }
}
