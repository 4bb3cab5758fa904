//! Key-value persistence for the chosen quality level.

use crate::constants::QUALITY_STORAGE_KEY;
use crate::error::StoreError;
use crate::quality::QualityLevel;
use fnv::FnvHashMap;

/// String key-value backend (browser `localStorage`, a file, or memory).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store used by tests and when no real backend is reachable.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: FnvHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Reads the persisted level. Read failures and unknown values count as absent.
pub fn load_quality(store: &dyn KeyValueStore) -> Option<QualityLevel> {
    match store.get(QUALITY_STORAGE_KEY) {
        Ok(raw) => {
            let level = QualityLevel::from_persisted(raw.as_deref());
            if level.is_none() {
                if let Some(bad) = raw {
                    log::debug!("[store] ignoring persisted quality '{}'", bad);
                }
            }
            level
        }
        Err(e) => {
            log::warn!("[store] {}", e);
            None
        }
    }
}

/// Persists `level`; failures are logged and otherwise ignored.
pub fn save_quality(store: &mut dyn KeyValueStore, level: QualityLevel) {
    if let Err(e) = store.set(QUALITY_STORAGE_KEY, level.as_str()) {
        log::warn!("[store] {}", e);
    }
}

pub fn clear_quality(store: &mut dyn KeyValueStore) {
    if let Err(e) = store.remove(QUALITY_STORAGE_KEY) {
        log::warn!("[store] {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Read {
                key: key.to_string(),
                reason: "quota".into(),
            })
        }
        fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                key: key.to_string(),
                reason: "quota".into(),
            })
        }
        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("private mode".into()))
        }
    }

    #[test]
    fn round_trips_through_memory() {
        let mut store = MemoryStore::new();
        assert_eq!(load_quality(&store), None);
        save_quality(&mut store, QualityLevel::Low);
        assert_eq!(load_quality(&store), Some(QualityLevel::Low));
        clear_quality(&mut store);
        assert_eq!(load_quality(&store), None);
    }

    #[test]
    fn garbage_is_treated_as_absent() {
        let store = MemoryStore::with_entry(QUALITY_STORAGE_KEY, "ultra");
        assert_eq!(load_quality(&store), None);
    }

    #[test]
    fn broken_backend_never_fails_the_caller() {
        let mut store = BrokenStore;
        assert_eq!(load_quality(&store), None);
        save_quality(&mut store, QualityLevel::High);
        clear_quality(&mut store);
    }
}
