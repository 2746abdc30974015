use super::{KeyValueStore, StoreError};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;
use std::sync::{PoisonError, RwLock};

/// Key-value store persisted as a single JSON object on disk.
///
/// The whole document is rewritten on every `set` and `remove`. Concurrent
/// writers from other processes are not detected.
#[derive(Debug)]
pub struct FileStore {
    path: Utf8PathBuf,
    entries: RwLock<IndexMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file starts an empty store; the file is created on first write.
    pub fn open<P: AsRef<Utf8Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                IndexMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            IndexMap::new()
        };

        tracing::debug!("Opened file store at {} ({} keys)", path, entries.len());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Write `entries` to disk. Callers only adopt a change once this succeeds.
    fn flush(&self, entries: &IndexMap<String, String>) -> Result<(), StoreError> {
        let document = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, document)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut staged = entries.clone();
        staged.insert(key.to_string(), value.to_string());
        self.flush(&staged)?;
        *entries = staged;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut staged = entries.clone();
        staged.shift_remove(key);
        self.flush(&staged)?;
        *entries = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store_path() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("data").join("store.json")).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_values_survive_reopen() {
        let (_temp_dir, path) = temp_store_path();

        let store = FileStore::open(&path).unwrap();
        store.set("adminPassword", "secret").unwrap();
        store.set("currentUser", "{}").unwrap();
        store.remove("currentUser").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("adminPassword").unwrap().as_deref(), Some("secret"));
        assert!(reopened.get("currentUser").unwrap().is_none());
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let (_temp_dir, path) = temp_store_path();
        let store = FileStore::open(&path).unwrap();

        assert!(store.get("users").unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let (temp_dir, path) = temp_store_path();
        let store = FileStore::open(&path).unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        fs::remove_dir_all(temp_dir.path().join("data")).unwrap();

        assert!(matches!(store.set("a", "changed"), Err(StoreError::Io(_))));
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        assert!(matches!(store.remove("b"), Err(StoreError::Io(_))));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_corrupt_document_is_rejected() {
        let (_temp_dir, path) = temp_store_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Serialization(_))));
    }
}
