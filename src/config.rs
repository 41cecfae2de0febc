//! Configuration persistence for shelvcmp settings.
//!
//! Settings are stored in `~/.config/shelvcmp/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Offer a second user whose shelvesets are listed alongside the first
    pub two_users_view: bool,
    /// Owner used when `list` gets no `--user`; empty means the current user
    pub default_user: String,
    /// Cap on listed shelvesets, 0 for no limit
    pub max_shelvesets: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            two_users_view: true,
            default_user: String::new(),
            max_shelvesets: 0,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl Config {
    /// Update one setting from its `config set` spelling
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key.replace('-', "_").as_str() {
            "two_users_view" => self.two_users_view = value.parse().map_err(|_| invalid())?,
            "default_user" => self.default_user = value.trim().to_string(),
            "max_shelvesets" => self.max_shelvesets = value.parse().map_err(|_| invalid())?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// Returns the path to the config file: `~/.config/shelvcmp/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("shelvcmp").join("config.toml"))
}

/// Load configuration from disk. Returns default if file is missing or invalid.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

/// Save configuration to disk. Creates the config directory if needed.
pub fn save(config: &Config) -> std::io::Result<()> {
    let Some(path) = config_path() else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine config directory",
        ));
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    std::fs::write(&path, contents)
}
