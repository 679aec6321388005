//! RON-file settings store.
//!
//! Backs the engine's `SettingsStore` seam with a small RON document,
//! written atomically (temp file then rename) so a crash mid-write never
//! leaves a torn settings file. Read and parse failures degrade to an
//! empty document; the engine's typed loaders then default.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use outline_engine::{SettingsError, SettingsStore};
use outline_logging::{outline_info, outline_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedSettings {
    values: BTreeMap<String, String>,
}

/// Settings persisted as RON at a fixed path.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> PersistedSettings {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return PersistedSettings::default();
            }
            Err(err) => {
                outline_warn!("failed to read settings from {:?}: {}", self.path, err);
                return PersistedSettings::default();
            }
        };
        match ron::from_str(&content) {
            Ok(settings) => settings,
            Err(err) => {
                outline_warn!("failed to parse settings from {:?}: {}", self.path, err);
                PersistedSettings::default()
            }
        }
    }

    fn write_document(&self, settings: &PersistedSettings) -> Result<(), SettingsError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(settings, pretty)
            .map_err(|err| SettingsError::Backend(err.to_string()))?;
        atomic_write(&self.path, &content).map_err(|err| SettingsError::Backend(err.to_string()))
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, SettingsError> {
        let document = self.read_document();
        Ok(keys
            .iter()
            .filter_map(|key| {
                document
                    .values
                    .get(*key)
                    .map(|value| ((*key).to_owned(), value.clone()))
            })
            .collect())
    }

    fn set(&self, values: &[(String, String)]) -> Result<(), SettingsError> {
        let mut document = self.read_document();
        for (key, value) in values {
            document.values.insert(key.clone(), value.clone());
        }
        self.write_document(&document)?;
        outline_info!("persisted {} setting(s) to {:?}", values.len(), self.path);
        Ok(())
    }
}

/// Writes `content` to `path` via a temp file in the same directory,
/// then renames it into place.
fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
