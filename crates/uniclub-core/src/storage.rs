//! # Key-Value Persistence Port
//!
//! The small get/set/remove interface that stands in for browser storage.
//! Carts, the signed-in user and the order-note scratch value all go
//! through it, so nothing in this crate touches a real backend.
//!
//! ```text
//! ┌───────────────────┐        ┌──────────────────────────────┐
//! │  CartStore        │        │  KeyValueStore (trait)       │
//! │  SessionStore     │ ─────► │  ├── MemoryStore   (here)    │
//! └───────────────────┘        │  └── JsonFileStore (service) │
//!                              └──────────────────────────────┘
//! ```
//!
//! Writers do read-modify-write without locking across calls. Two writers
//! on the same key race and the last one wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::types::SessionUser;
use crate::{ORDER_NOTE_KEY, USER_KEY};

// =============================================================================
// Port
// =============================================================================

/// String values addressed by string keys.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any earlier value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes the key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// =============================================================================
// JSON helpers
// =============================================================================

/// Reads and decodes a JSON value.
///
/// A blob that no longer decodes is treated as absent and logged, the same
/// way a browser front end would start over with an empty value.
pub fn read_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key = key, error = %e, "Discarding unreadable stored value");
            Ok(None)
        }
    }
}

/// Encodes and stores a JSON value.
pub fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, &raw)
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-process store, used by tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, key: &str) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries.lock().map_err(|_| StorageError::Backend {
            key: key.to_string(),
            reason: "memory store lock poisoned".to_string(),
        })
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock(key)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock(key)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock(key)?.remove(key);
        Ok(())
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// The signed-in user record and the order-note scratch value.
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        SessionStore { store }
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Result<Option<SessionUser>, StorageError> {
        read_json(&self.store, USER_KEY)
    }

    pub fn login(&self, user: &SessionUser) -> Result<(), StorageError> {
        write_json(&self.store, USER_KEY, user)?;
        debug!(user_id = user.id, "Session started");
        Ok(())
    }

    /// Forgets the stored credentials.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.store.remove(USER_KEY)?;
        debug!("Session cleared");
        Ok(())
    }

    /// The note typed on the cart page, carried to checkout.
    pub fn order_note(&self) -> Result<Option<String>, StorageError> {
        Ok(self.store.get(ORDER_NOTE_KEY)?.filter(|n| !n.trim().is_empty()))
    }

    pub fn set_order_note(&self, note: &str) -> Result<(), StorageError> {
        if note.trim().is_empty() {
            self.store.remove(ORDER_NOTE_KEY)
        } else {
            self.store.set(ORDER_NOTE_KEY, note)
        }
    }

    pub fn clear_order_note(&self) -> Result<(), StorageError> {
        self.store.remove(ORDER_NOTE_KEY)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: 7,
            email: "khach@gmail.com".to_string(),
            full_name: "Nguyễn Văn A".to_string(),
            token: "t0k3n".to_string(),
        }
    }

    #[test]
    fn test_memory_store_basics() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_corrupt_json_reads_as_absent() {
        let store = MemoryStore::new();
        store.set(USER_KEY, "{not json").unwrap();
        let user: Option<SessionUser> = read_json(&store, USER_KEY).unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn test_session_login_logout() {
        let session = SessionStore::new(MemoryStore::new());
        assert!(session.current_user().unwrap().is_none());

        session.login(&user()).unwrap();
        assert_eq!(session.current_user().unwrap(), Some(user()));

        session.logout().unwrap();
        assert!(session.current_user().unwrap().is_none());
    }

    #[test]
    fn test_user_record_is_camel_case() {
        let store = Arc::new(MemoryStore::new());
        SessionStore::new(Arc::clone(&store)).login(&user()).unwrap();
        let raw = store.get(USER_KEY).unwrap().unwrap();
        assert!(raw.contains("\"fullName\":\"Nguyễn Văn A\""));
    }

    #[test]
    fn test_order_note_blank_is_absent() {
        let session = SessionStore::new(MemoryStore::new());
        session.set_order_note("Giao giờ hành chính").unwrap();
        assert_eq!(
            session.order_note().unwrap().as_deref(),
            Some("Giao giờ hành chính")
        );

        session.set_order_note("   ").unwrap();
        assert_eq!(session.order_note().unwrap(), None);
    }
}
