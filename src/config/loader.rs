use std::path::{Path, PathBuf};
use tokio::fs;

use super::{HarnessConfig, DEFAULT_CONFIG_FILE};
use crate::error::{HarnessError, Result};

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, `acceptance.toml` in the base
    /// directory is used when present, otherwise the defaults. A relative
    /// bundle path is resolved against the directory of the file it came from.
    pub async fn load(&self, explicit: Option<&Path>) -> Result<HarnessConfig> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(HarnessError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = self.base_dir.join(DEFAULT_CONFIG_FILE);
                candidate.exists().then_some(candidate)
            }
        };

        let mut config = match &path {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                let content = fs::read_to_string(path).await?;
                let mut config: HarnessConfig = toml::from_str(&content)?;
                if config.bundle.is_relative() {
                    let dir = path.parent().unwrap_or(self.base_dir.as_path());
                    config.bundle = dir.join(&config.bundle);
                }
                config
            }
            None => {
                tracing::debug!("No configuration file, using defaults");
                HarnessConfig {
                    bundle: self.base_dir.join("bundle.yaml"),
                    ..HarnessConfig::default()
                }
            }
        };

        config.merge_env_vars();
        Ok(config)
    }
}
