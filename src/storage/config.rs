use super::Result;
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// One server connection: a neuPrint endpoint and the dataset queried by
/// default.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Profile {
    pub server: String,
    pub data_set: Option<String>,
}

impl Config {
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
                message: e.to_string(),
            })?;

        Ok(config)
    }

    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigParseError {
            message: e.to_string(),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(StorageError::ConfigDirNotFound)?;
        Ok(config_dir.join("cnx-cli").join("config.toml"))
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_profile, None);
        assert_eq!(config.profiles.len(), 0);
    }

    #[test]
    fn test_profile_management() {
        let mut config = Config::default();
        let profile = Profile {
            server: "https://neuprint.janelia.org".to_string(),
            data_set: Some("hemibrain".to_string()),
        };
        config.set_profile("janelia".to_string(), profile.clone());

        let retrieved = config.get_profile("janelia").unwrap();
        assert_eq!(retrieved.server, profile.server);
        assert_eq!(retrieved.data_set, profile.data_set);
        assert!(config.get_profile("nonexistent").is_none());
    }

    #[test]
    fn test_config_load_save_round_trip() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.default_profile = Some("janelia".to_string());
        config.profiles.insert(
            "janelia".to_string(),
            Profile {
                server: "https://neuprint.janelia.org".to_string(),
                data_set: None,
            },
        );

        config
            .save(Some(config_path.clone()))
            .expect("Failed to save config");
        let loaded = Config::load(Some(config_path)).expect("Failed to load config");

        assert_eq!(loaded.default_profile, config.default_profile);
        assert!(loaded.get_profile("janelia").is_some());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load(Some(temp_dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.profiles.len(), 0);
    }

    #[test]
    fn test_load_malformed_file_reports_parse_error() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "default_profile = [not toml").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(matches!(err, StorageError::ConfigParseError { .. }));
    }
}
