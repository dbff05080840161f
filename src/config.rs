use crate::error::{FixupError, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Path to the venue name -> canonical URL table.
    #[serde(default = "default_registry_path")]
    pub registry_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Minimum delay between consecutive page fetches, in milliseconds.
    pub delay_ms: u64,
    pub timeout_seconds: u64,
}

fn default_registry_path() -> String {
    "venues.toml".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1500,
            timeout_seconds: 15,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            registry_path: default_registry_path(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            FixupError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
