use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use super::{KeyValueStore, StorageError};

/// Process-local key-value slot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// One file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{load_json, save_json};

    #[test]
    fn file_store_round_trips_and_removes() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        store.set("cart", "[1,2]")?;
        assert_eq!(store.get("cart")?.as_deref(), Some("[1,2]"));

        store.remove("cart")?;
        store.remove("cart")?;
        assert_eq!(store.get("cart")?, None);
        Ok(())
    }

    #[test]
    fn corrupted_payload_is_deleted_on_load() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.set("wishlist", "{not json")?;

        let loaded: Option<Vec<u32>> = load_json(&store, "wishlist");

        assert_eq!(loaded, None);
        assert_eq!(store.get("wishlist")?, None);
        Ok(())
    }

    #[test]
    fn save_json_writes_serialized_value() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        save_json(&store, "numbers", &vec![3, 4])?;

        let loaded: Option<Vec<u32>> = load_json(&store, "numbers");
        assert_eq!(loaded, Some(vec![3, 4]));
        Ok(())
    }
}
