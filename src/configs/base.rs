use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::configs::*;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: String,
    source: std::io::Error,
  },
  #[error("failed to parse {path}: {source}")]
  Parse {
    path: String,
    source: toml::de::Error,
  },
  #[error("PORT must be a port number, got '{0}'")]
  InvalidPort(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
  #[serde(default)]
  pub server: ServerConfig,
  pub logging: Option<LoggingConfig>,
  #[serde(default)]
  pub resolver: ResolverConfig,
  #[serde(default)]
  pub proxy: ProxyConfig,
}

const CONFIG_CANDIDATES: [&str; 2] = ["config.toml", "config.default.toml"];

impl Config {
  /// Loads the first config file found, falling back to built-in defaults,
  /// then applies the `PORT` environment override.
  pub fn load() -> Result<Self, ConfigError> {
    let mut config = match CONFIG_CANDIDATES.iter().find(|p| Path::new(p).exists()) {
      Some(path) => {
        crate::log_println!("Loading configuration from: {}", path);
        Self::from_file(path)?
      }
      None => {
        crate::log_println!("No config.toml found, using built-in defaults");
        Self::default()
      }
    };

    config.apply_port_override(std::env::var("PORT").ok().as_deref())?;
    Ok(config)
  }

  pub fn from_file(path: &str) -> Result<Self, ConfigError> {
    let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_string(),
      source,
    })?;
    Self::from_toml(path, &config_str)
  }

  pub fn from_toml(path: &str, config_str: &str) -> Result<Self, ConfigError> {
    toml::from_str(config_str).map_err(|source| ConfigError::Parse {
      path: path.to_string(),
      source,
    })
  }

  /// An unset or empty `PORT` keeps the configured port.
  pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<(), ConfigError> {
    let Some(raw) = port.map(str::trim).filter(|p| !p.is_empty()) else {
      return Ok(());
    };

    self.server.port = raw
      .parse::<u16>()
      .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;
    Ok(())
  }
}
