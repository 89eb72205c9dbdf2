//! Session token store.
//!
//! The admin's API token is the only state shared between pages. Instead of an
//! ambient global, each request builds a [`TokenStore`] from its server-side
//! session and hands it to the [`ApiClient`](crate::ApiClient) and the route
//! guard explicitly.

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

/// Key under which the token is kept in the server-side session.
pub const SESSION_TOKEN_KEY: &str = "auth_token";

/// Holder of the admin's API token.
///
/// Clones share one slot, so a token cleared by the API client after a `401`
/// is visible to the handler that owns the session.
///
/// A *detached* store models a context without session storage (the public
/// site): reads return `None` and writes are ignored.
#[derive(Clone)]
pub struct TokenStore {
    slot: Option<Arc<RwLock<Option<SecretString>>>>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Some(Arc::new(RwLock::new(None))),
        }
    }

    /// Create a store that already holds a token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    /// Create a store with no backing storage.
    #[must_use]
    pub const fn detached() -> Self {
        Self { slot: None }
    }

    /// Store a token, replacing any previous one.
    ///
    /// Empty tokens are treated as a logout.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        if let Some(slot) = &self.slot {
            let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
            *guard = (!token.is_empty()).then(|| SecretString::from(token));
        }
    }

    /// Current token, if any.
    #[must_use]
    pub fn get(&self) -> Option<SecretString> {
        let slot = self.slot.as_ref()?;
        slot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Forget the token.
    pub fn clear(&self) {
        if let Some(slot) = &self.slot {
            *slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        }
    }

    /// Whether a token string is present.
    ///
    /// This says nothing about whether the API still accepts the token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.get()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("detached", &self.slot.is_none())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
