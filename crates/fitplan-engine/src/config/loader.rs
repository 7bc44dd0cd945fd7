use super::schema::FitplanConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_yaml::Error),
    #[error("No home directory to save the config in")]
    NoHome,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from an explicit path when given, otherwise from the default locations.
    pub async fn load(explicit: Option<&Path>) -> Result<FitplanConfig, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path).await,
            None => Self::load_default().await,
        }
    }

    /// Load from default locations:
    /// 1. ./fitplan.yaml
    /// 2. ~/.fitplan/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<FitplanConfig, ConfigError> {
        let local_config = PathBuf::from("./fitplan.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home_config) = Self::home_config_path() {
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(FitplanConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<FitplanConfig, ConfigError> {
        debug!("Loading config from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let config: FitplanConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Writes the config as YAML, creating parent directories as needed.
    pub async fn save_to(path: &Path, config: &FitplanConfig) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(config).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, content).await?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// The file `load` would read: explicit path, then ./fitplan.yaml if it
    /// exists, then the home config.
    pub fn save_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        let local_config = PathBuf::from("./fitplan.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }
        Self::home_config_path().ok_or(ConfigError::NoHome)
    }

    pub fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".fitplan").join("config.yaml"))
    }
}
