use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    clock::SystemClock,
    fs::{config_dir, data_dir},
    store::TomlStore,
};

const FILE_NAME: &str = "config.toml";
const SETTINGS_FILE_NAME: &str = "settings.toml";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to access the configuration file: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed configuration file: {0}")]
    Deserialize(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Deployment configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// `local`, `UTC` or a fixed offset like `+02:00`
    pub timezone: String,
    /// Where the settings record is kept. Defaults to the data directory.
    pub settings_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            timezone: "local".to_owned(),
            settings_path: None,
        }
    }
}

impl CoreConfig {
    /// Path of the configuration file in the XDG config directory.
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join(FILE_NAME))
    }

    /// Reads the configuration at `path`, writing out the defaults first if it doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            debug!("No configuration at {}, writing defaults", path.display());
            let cfg = Self::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn settings_path(&self) -> Result<PathBuf> {
        match &self.settings_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(SETTINGS_FILE_NAME)),
        }
    }

    pub fn store(&self) -> Result<TomlStore> {
        Ok(TomlStore::new(self.settings_path()?))
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock::new(self.timezone.clone())
    }

    #[cfg(test)]
    /// A configuration pointing the settings record into `dir`.
    pub(crate) fn mock(dir: &Path) -> Self {
        Self {
            timezone: "UTC".to_owned(),
            settings_path: Some(dir.join(SETTINGS_FILE_NAME)),
        }
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_creates_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = CoreConfig::load(&path).unwrap();

        assert_eq!(cfg, CoreConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_load_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timezone = \"+01:00\"\nsettings_path = \"/srv/site.toml\"\n").unwrap();

        let cfg = CoreConfig::load(&path).unwrap();

        assert_eq!(cfg.timezone, "+01:00");
        assert_eq!(cfg.settings_path().unwrap(), PathBuf::from("/srv/site.toml"));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(CoreConfig::load(&path).unwrap(), CoreConfig::default());
    }

    #[test]
    fn test_store_uses_settings_path() {
        let dir = tempdir().unwrap();
        let cfg = CoreConfig::mock(dir.path());

        assert_eq!(
            cfg.store().unwrap().path(),
            dir.path().join("settings.toml")
        );
    }
}
