//! Configuration settings for the rendez scheduling engine.

use crate::error::{ConfigError, Result};
use crate::locale::Locale;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("rendez.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("rendez/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".rendez/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        self.display_tz()?;
        self.locale()?;
        Ok(())
    }

    /// Timezone grids render in when the caller does not pick one.
    pub fn display_tz(&self) -> Result<Tz> {
        parse_tz(&self.display.timezone)
    }

    /// Locale grids render with when the caller does not pick one.
    pub fn locale(&self) -> Result<Locale> {
        Locale::from_code(&self.display.locale)
            .ok_or_else(|| ConfigError::UnknownLocale(self.display.locale.clone()).into())
    }

    /// Directory commitment snapshots persist under.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|p| p.join("rendez"))
            .ok_or_else(|| ConfigError::Invalid("no data directory available".to_string()).into())
    }
}

fn parse_tz(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimezone(name.to_string()).into())
}

/// Commitment storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Persist commitments to disk instead of keeping them in memory only.
    pub persist: bool,
    /// Data directory; platform default when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persist: false,
            data_dir: None,
        }
    }
}

/// Grid rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// IANA timezone grids render in.
    pub timezone: String,
    /// Locale code, e.g. `en_US` or `fr_FR`.
    pub locale: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            locale: "en_US".to_string(),
        }
    }
}
