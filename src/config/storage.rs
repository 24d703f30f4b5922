//! Storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where the cycle snapshot lives
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the snapshot file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Key the snapshot is stored under
    #[serde(default = "default_state_key")]
    pub state_key: String,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.state_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("storage.state_key"));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("storage.data_dir"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            state_key: default_state_key(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_state_key() -> String {
    crate::ports::STATE_KEY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.state_key, "cycles-state:1.0.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_state_key_rejected() {
        let config = StorageConfig {
            state_key: "  ".to_string(),
            ..StorageConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("storage.state_key"))
        ));
    }
}
