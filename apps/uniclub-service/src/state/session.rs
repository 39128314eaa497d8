//! # Session State
//!
//! The signed-in shopper and the order note typed on the cart page.

use tracing::warn;

use uniclub_core::storage::SessionStore;
use uniclub_core::{SessionUser, StorageError};

use super::SharedStore;
use crate::error::{ApiError, ApiResult};

pub struct SessionState {
    store: SessionStore<SharedStore>,
}

impl SessionState {
    pub fn new(store: SharedStore) -> Self {
        SessionState {
            store: SessionStore::new(store),
        }
    }

    pub fn current_user(&self) -> Result<Option<SessionUser>, StorageError> {
        self.store.current_user()
    }

    pub fn login(&self, user: &SessionUser) -> Result<(), StorageError> {
        self.store.login(user)
    }

    pub fn logout(&self) -> Result<(), StorageError> {
        self.store.logout()
    }

    /// The signed-in user, or `UNAUTHORIZED` after wiping whatever
    /// credentials were stored.
    pub fn require_user(&self) -> ApiResult<SessionUser> {
        match self.store.current_user()? {
            Some(user) if !user.token.trim().is_empty() => Ok(user),
            _ => {
                warn!("No usable session, clearing stored credentials");
                self.store.logout()?;
                Err(ApiError::unauthorized())
            }
        }
    }

    pub fn order_note(&self) -> Result<Option<String>, StorageError> {
        self.store.order_note()
    }

    pub fn set_order_note(&self, note: &str) -> Result<(), StorageError> {
        self.store.set_order_note(note)
    }

    pub fn clear_order_note(&self) -> Result<(), StorageError> {
        self.store.clear_order_note()
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::sync::Arc;
    use uniclub_core::storage::{KeyValueStore, MemoryStore};
    use uniclub_core::USER_KEY;

    #[test]
    fn test_require_user_clears_bad_credentials() {
        let backend = Arc::new(MemoryStore::new());
        let session = SessionState::new(backend.clone());

        backend.set(USER_KEY, "{broken").unwrap();
        let err = session.require_user().unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert_eq!(backend.get(USER_KEY).unwrap(), None);

        let user = SessionUser {
            id: 7,
            email: "khach@gmail.com".to_string(),
            full_name: "Nguyễn Văn A".to_string(),
            token: "t0k3n".to_string(),
        };
        session.login(&user).unwrap();
        assert_eq!(session.require_user().unwrap(), user);

        session.login(&SessionUser { token: String::new(), ..user }).unwrap();
        assert!(session.require_user().is_err());
        assert_eq!(backend.get(USER_KEY).unwrap(), None);
    }
}
