//! # File-backed Key-Value Store
//!
//! [`KeyValueStore`] over a directory, one file per key:
//!
//! ```text
//! <storage_dir>/
//! ├── uniclub_cart.json
//! ├── uniclub_user.json
//! └── order_note.json
//! ```
//!
//! Writes go to a sibling temp file and are renamed into place, so a reader
//! never sees a half-written value.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use uniclub_core::storage::KeyValueStore;
use uniclub_core::StorageError;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (and creates if needed) the storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::Backend {
            key: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(dir = %dir.display(), "File store opened");
        Ok(JsonFileStore { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::Backend {
                key: key.to_string(),
                reason: "keys may only contain letters, digits, '_' and '-'".to_string(),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn backend(key: &str, err: std::io::Error) -> StorageError {
    StorageError::Backend {
        key: key.to_string(),
        reason: err.to_string(),
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(backend(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| backend(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| backend(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(backend(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("uniclub-{name}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn test_get_set_remove() {
        let dir = scratch_dir("store");
        let store = JsonFileStore::open(&dir).unwrap();

        assert_eq!(store.get("uniclub_cart").unwrap(), None);
        store.set("uniclub_cart", "[]").unwrap();
        assert_eq!(store.get("uniclub_cart").unwrap().as_deref(), Some("[]"));
        assert!(dir.join("uniclub_cart.json").exists());

        store.remove("uniclub_cart").unwrap();
        store.remove("uniclub_cart").unwrap();
        assert_eq!(store.get("uniclub_cart").unwrap(), None);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = scratch_dir("reopen");
        JsonFileStore::open(&dir)
            .unwrap()
            .set("order_note", "Giao buổi chiều")
            .unwrap();

        let reopened = JsonFileStore::open(&dir).unwrap();
        assert_eq!(
            reopened.get("order_note").unwrap().as_deref(),
            Some("Giao buổi chiều")
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_path_like_keys_are_refused() {
        let dir = scratch_dir("keys");
        let store = JsonFileStore::open(&dir).unwrap();
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
