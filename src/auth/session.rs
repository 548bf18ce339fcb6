//! Auth session.
//!
//! A single owned handle over the bearer token. It is cloned into the API
//! client and the app, so every outbound call reads the current credential
//! from here instead of some ambient global.

use std::sync::{Arc, RwLock};

use crate::core::{Error, Result, SharedStore, TOKEN_STORAGE_KEY};

#[derive(Debug)]
struct SessionState {
    token: Option<String>,
    loading: bool,
}

#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    storage: SharedStore,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("is_authenticated", &self.is_authenticated())
            .field("loading", &self.is_loading())
            .finish()
    }
}

impl Session {
    /// A fresh, not yet restored session. `is_loading` is true until `restore`.
    pub fn new(storage: SharedStore) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState {
                token: None,
                loading: true,
            })),
            storage,
        }
    }

    /// Load a persisted token, if any.
    ///
    /// Returns `Some(is_authenticated)` the first time it completes and
    /// `None` on later calls, so readiness is reported exactly once. A
    /// storage read failure is logged and treated as "no token".
    pub fn restore(&self) -> Option<bool> {
        if !self.is_loading() {
            return None;
        }

        let stored = match self.storage.get(TOKEN_STORAGE_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::error!("Failed to read persisted token: {}", e);
                None
            }
        };

        let mut state = self.write();
        if !state.loading {
            return None;
        }
        state.loading = false;
        state.token = stored;
        let authenticated = state.token.is_some();
        tracing::debug!(authenticated, "Session restored");

        Some(authenticated)
    }

    /// Mark the session authenticated with an already validated token and
    /// persist it. No network call happens here.
    pub fn login(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(Error::Authentication(
                "Received an empty access token".to_string(),
            ));
        }

        // Nothing changes in memory unless the token was persisted
        self.storage.set(TOKEN_STORAGE_KEY, token)?;
        {
            let mut state = self.write();
            state.token = Some(token.to_string());
            state.loading = false;
        }
        tracing::info!("Logged in");

        Ok(())
    }

    /// Drop the token from memory and storage. Safe to call repeatedly.
    ///
    /// The in-memory token is always cleared. A failure to remove the
    /// persisted copy is still reported.
    pub fn logout(&self) -> Result<()> {
        let was_authenticated = {
            let mut state = self.write();
            state.token.take().is_some()
        };
        if was_authenticated {
            tracing::info!("Logged out");
        }

        self.storage.remove(TOKEN_STORAGE_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Value for the `Authorization` header while authenticated.
    pub fn bearer(&self) -> Option<String> {
        self.read().token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{KeyValueStore, MemoryStore};

    fn session_with(store: Arc<MemoryStore>) -> Session {
        Session::new(store)
    }

    #[test]
    fn it_starts_loading_and_unauthenticated() {
        let session = session_with(Arc::new(MemoryStore::new()));
        assert!(session.is_loading());
        assert!(!session.is_authenticated());
        assert_eq!(session.bearer(), None);
    }

    #[test]
    fn it_reports_readiness_once() {
        let session = session_with(Arc::new(MemoryStore::new()));
        assert_eq!(session.restore(), Some(false));
        assert!(!session.is_loading());
        assert_eq!(session.restore(), None);
    }

    #[test]
    fn it_restores_a_persisted_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_STORAGE_KEY, "abc").unwrap();

        let session = session_with(store);
        assert_eq!(session.restore(), Some(true));
        assert_eq!(session.token(), Some("abc".to_string()));
        assert_eq!(session.bearer(), Some("Bearer abc".to_string()));
    }

    #[test]
    fn it_ignores_an_empty_persisted_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_STORAGE_KEY, "").unwrap();

        let session = session_with(store);
        assert_eq!(session.restore(), Some(false));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn login_persists_and_logout_clears() {
        let store = Arc::new(MemoryStore::new());
        let session = session_with(store.clone());
        session.restore();

        session.login("abc").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(store.get(TOKEN_STORAGE_KEY).unwrap(), Some("abc".to_string()));

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(store.get(TOKEN_STORAGE_KEY).unwrap(), None);

        // Idempotent
        session.logout().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn login_rejects_empty_tokens() {
        let session = session_with(Arc::new(MemoryStore::new()));
        assert!(session.login("").is_err());
        assert!(!session.is_authenticated());
    }

    /// Store whose writes always fail
    #[derive(Default)]
    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage(std::io::Error::other("disk full")))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn login_leaves_the_session_unchanged_when_the_token_cannot_be_saved() {
        let session = Session::new(Arc::new(ReadOnlyStore::default()));
        session.restore();

        let err = session.login("abc").unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!session.is_authenticated());
        assert_eq!(session.bearer(), None);
    }

    #[test]
    fn logout_clears_memory_even_when_storage_fails() {
        let store = ReadOnlyStore::default();
        store.inner.set(TOKEN_STORAGE_KEY, "abc").unwrap();
        let session = Session::new(Arc::new(store));
        assert_eq!(session.restore(), Some(true));

        assert!(matches!(session.logout(), Err(Error::Storage(_))));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clones_share_state() {
        let session = session_with(Arc::new(MemoryStore::new()));
        let handle = session.clone();
        session.login("abc").unwrap();
        assert_eq!(handle.bearer(), Some("Bearer abc".to_string()));
    }
}
