//! Persistence for the single settings record.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info};

use crate::settings::Settings;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to access the settings file: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed settings file: {0}")]
    Deserialize(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Get/set access to the stored settings record.
pub trait SettingsStore {
    /// `None` until something has been saved.
    fn load(&self) -> Result<Option<Settings>>;

    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Stores the record as a TOML document, keyed by [`Settings::OPTION_KEY`].
#[derive(Debug, Clone)]
pub struct TomlStore {
    path: PathBuf,
}

impl TomlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlStore {
    fn load(&self) -> Result<Option<Settings>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let mut document: BTreeMap<String, Settings> = toml::from_str(&contents)?;

        Ok(document.remove(Settings::OPTION_KEY))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let document = BTreeMap::from([(Settings::OPTION_KEY, settings)]);
        let contents = toml::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)?;

        debug!("Saved settings to {}", self.path.display());

        Ok(())
    }
}

/// Keeps the record in memory. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    settings: Arc<RwLock<Option<Settings>>>,
}

impl MemoryStore {
    pub fn new(settings: Option<Settings>) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Settings>> {
        Ok(self.settings.read().clone())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        *self.settings.write() = Some(settings.clone());
        Ok(())
    }
}

/// The stored record, or the defaults when nothing has been saved yet.
pub fn load_or_default<S: SettingsStore + ?Sized>(store: &S) -> Result<Settings> {
    Ok(store.load()?.unwrap_or_default())
}

/// Stores the default record unless one already exists, and returns the stored record.
pub fn activate<S: SettingsStore + ?Sized>(store: &S) -> Result<Settings> {
    if let Some(existing) = store.load()? {
        return Ok(existing);
    }

    let settings = Settings::default();
    store.save(&settings)?;

    info!("Stored default settings");

    Ok(settings)
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;
    use crate::settings::{Position, SpecialPage};

    #[test]
    fn test_toml_store_missing_file() {
        let dir = tempdir().unwrap();
        let store = TomlStore::new(dir.path().join("settings.toml"));

        assert_eq!(store.load().unwrap(), None);
        assert_eq!(load_or_default(&store).unwrap(), Settings::default());
    }

    #[test]
    fn test_toml_store_save_and_load() {
        let dir = tempdir().unwrap();
        let store = TomlStore::new(dir.path().join("nested").join("settings.toml"));
        let settings = Settings {
            enabled: true,
            phone: "+420123".into(),
            position: Position::Left,
            exclude_special: vec![SpecialPage::NotFound, SpecialPage::Archive],
            exclude_page_ids: vec![5, 9],
            ..Default::default()
        };

        store.save(&settings).unwrap();

        assert_eq!(store.load().unwrap(), Some(settings));
        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("[wpmu_whatsapp_settings]"));
        assert!(contents.contains("\"404\""));
    }

    #[test]
    fn test_toml_store_fills_missing_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[wpmu_whatsapp_settings]\nphone = \"123\"\n").unwrap();

        let settings = TomlStore::new(path).load().unwrap().unwrap();

        assert_eq!(settings.phone, "123");
        assert_eq!(settings.time_to, "17:00");
    }

    #[test]
    fn test_toml_store_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[wpmu_whatsapp_settings\n").unwrap();

        assert!(matches!(
            TomlStore::new(path).load(),
            Err(Error::Deserialize(_))
        ));
    }

    #[test]
    fn test_activate_keeps_existing() {
        let existing = Settings {
            phone: "1".into(),
            ..Default::default()
        };
        let store = MemoryStore::new(Some(existing.clone()));

        assert_eq!(activate(&store).unwrap(), existing);
    }

    #[test]
    fn test_activate_stores_defaults() {
        let store = MemoryStore::default();

        activate(&store).unwrap();

        assert_eq!(store.load().unwrap(), Some(Settings::default()));
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = MemoryStore::default();
        let handle = store.clone();

        handle.save(&Settings::default()).unwrap();

        assert!(store.load().unwrap().is_some());
    }
}
