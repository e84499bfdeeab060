use super::schema::SpoorConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path (usually from the command line) wins over
    /// discovery; discovery falls back to defaults.
    pub async fn load_or_default(path: Option<&Path>) -> Result<SpoorConfig, ConfigError> {
        match path {
            Some(p) => Self::load_from(p).await,
            None => Self::load_default().await,
        }
    }

    /// Load from default locations:
    /// 1. ./spoor.yaml
    /// 2. ~/.spoor/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<SpoorConfig, ConfigError> {
        let local_config = PathBuf::from("./spoor.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".spoor").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(SpoorConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<SpoorConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: SpoorConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
