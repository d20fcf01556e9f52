//! Durable bearer-token and login-flag storage.
//!
//! Two keys are kept in the device's [`KeyValueStorage`]:
//!
//! - [`TOKEN_KEY`] - the bearer token returned by login
//! - [`LOGIN_STATE_KEY`] - `"true"` / `"false"` login marker
//!
//! When no storage is configured every write is a no-op and every read
//! reports "absent". Storage failures are logged and treated the same way;
//! a broken storage file must never block the login screen.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::storage::KeyValueStorage;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "grocify_auth_token";

/// Storage key for the login marker.
pub const LOGIN_STATE_KEY: &str = "isLoggedIn";

/// Token and login-state persistence.
///
/// Cheap to clone; clones share the same backing storage.
#[derive(Clone, Default)]
pub struct TokenStore {
    storage: Option<Arc<dyn KeyValueStorage>>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("persistent", &self.is_persistent())
            .finish()
    }
}

impl TokenStore {
    /// Create a token store backed by `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    /// Create a token store with no durable storage.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Whether writes go anywhere.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    /// Persist the bearer token. Empty tokens are ignored.
    pub fn set_token(&self, token: &SecretString) {
        let value = token.expose_secret();
        if value.is_empty() {
            return;
        }
        self.write(TOKEN_KEY, value);
    }

    /// The persisted bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read(TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    pub fn remove_token(&self) {
        self.delete(TOKEN_KEY);
    }

    pub fn set_login_state(&self, logged_in: bool) {
        self.write(LOGIN_STATE_KEY, if logged_in { "true" } else { "false" });
    }

    /// The persisted login marker. Only the exact string `"true"` counts.
    #[must_use]
    pub fn login_state(&self) -> bool {
        self.read(LOGIN_STATE_KEY).as_deref() == Some("true")
    }

    pub fn clear_login_state(&self) {
        self.delete(LOGIN_STATE_KEY);
    }

    /// Headers for requests to the auth backend and document store.
    ///
    /// Always carries `Content-Type: application/json`. Adds
    /// `Authorization: Bearer <token>` only when a token is stored.
    #[must_use]
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.token() {
            match HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value, omitting it"),
            }
        }

        headers
    }

    fn read(&self, key: &str) -> Option<String> {
        let storage = self.storage.as_ref()?;
        storage.get(key).unwrap_or_else(|e| {
            warn!(key, error = %e, "Failed to read token storage");
            None
        })
    }

    fn write(&self, key: &str, value: &str) {
        if let Some(storage) = &self.storage
            && let Err(e) = storage.set(key, value)
        {
            warn!(key, error = %e, "Failed to write token storage");
        }
    }

    fn delete(&self, key: &str) {
        if let Some(storage) = &self.storage
            && let Err(e) = storage.remove(key)
        {
            warn!(key, error = %e, "Failed to clear token storage");
        }
    }
}
