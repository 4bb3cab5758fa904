use folio_core::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const STATE_FILE_NAME: &str = "quality.json";

/// On-disk shape of the harness state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// JSON state file, rewritten on every change.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `quality.json` in the platform config directory.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "wifsimster", "folio")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self, key: &str) -> Result<StateFile, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StateFile::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| StoreError::Read {
            key: key.to_string(),
            reason: format!("{}: {}", self.path.display(), e),
        })
    }

    /// Like `load`, but a corrupt file is replaced on the next write.
    fn load_for_update(&self, key: &str) -> Result<StateFile, StoreError> {
        match self.load(key) {
            Err(e @ StoreError::Read { .. }) => {
                log::warn!("[store] {}; starting from an empty state", e);
                Ok(StateFile::default())
            }
            other => other,
        }
    }

    fn save(&self, key: &str, state: &StateFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(state).map_err(|e| StoreError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load(key)?.entries.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut state = self.load_for_update(key)?;
        state.entries.insert(key.to_string(), value.to_string());
        self.save(key, &state)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut state = self.load_for_update(key)?;
        if state.entries.remove(key).is_some() {
            self.save(key, &state)?;
        }
        Ok(())
    }
}
