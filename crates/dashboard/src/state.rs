//! Session state and the application state container.
//!
//! [`SessionState`] is the explicit, injectable replacement for a global
//! auth store: it pairs the in-memory session flag with the durable
//! [`TokenStore`]. [`AppState`] wires every service the views need.

use std::sync::{Arc, PoisonError, RwLock};

use grocify_core::Email;
use reqwest::header::HeaderMap;
use secrecy::SecretString;
use tracing::info;

use crate::auth::{AuthClient, AuthGate, Authorized, TokenStore};
use crate::commands::ProductCommands;
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::feed::ProductFeed;
use crate::middleware::RouteGuard;
use crate::storage::FileStorage;
use crate::store::{AnyStore, DocumentStore};
use crate::views::{AnalyticsView, LoginView, ProductsView};

/// Point-in-time view of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_authenticated: bool,
    /// Email of the user who logged in through this process, if any.
    pub user_email: Option<Email>,
}

/// Shared session state.
///
/// Starts unauthenticated on every run, whatever the durable login marker
/// says; only the auth gate may flip it after the backend confirms.
#[derive(Debug, Clone)]
pub struct SessionState {
    session: Arc<RwLock<Session>>,
    tokens: TokenStore,
}

impl SessionState {
    #[must_use]
    pub fn new(tokens: TokenStore) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::default())),
            tokens,
        }
    }

    /// Build the session from configuration.
    ///
    /// Uses a file-backed token store when `state_path` is set, and a
    /// detached one otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file exists but cannot be read.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let tokens = match &config.state_path {
            Some(path) => TokenStore::new(Arc::new(FileStorage::open(path)?)),
            None => TokenStore::detached(),
        };
        Ok(Self::new(tokens))
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated
    }

    #[must_use]
    pub fn user_email(&self) -> Option<Email> {
        self.snapshot().user_email
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Headers carrying the stored bearer token, if any.
    #[must_use]
    pub fn auth_headers(&self) -> HeaderMap {
        self.tokens.auth_headers()
    }

    /// Record a successful login.
    pub fn login_success(&self, email: Email, token: Option<SecretString>) {
        if let Some(token) = token {
            self.tokens.set_token(&token);
        }
        self.tokens.set_login_state(true);

        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        session.is_authenticated = true;
        session.user_email = Some(email);
    }

    /// Record that the backend confirmed the session.
    pub fn mark_verified(&self) {
        self.tokens.set_login_state(true);
        self.session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated = true;
    }

    /// Drop every trace of the session, in memory and on disk.
    pub fn clear(&self) {
        self.tokens.remove_token();
        self.tokens.clear_login_state();
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Session::default();
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Services shared by every view.
///
/// Cheap to clone.
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<S> {
    config: DashboardConfig,
    session: SessionState,
    gate: AuthGate,
    feed: ProductFeed<S>,
    commands: ProductCommands<S>,
}

impl AppState<AnyStore> {
    /// Build the full dashboard stack from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token state file is unreadable or an
    /// endpoint URL cannot be built.
    pub fn from_config(config: DashboardConfig) -> Result<Self, DashboardError> {
        let session = SessionState::from_config(&config)?;
        let store = AnyStore::from_config(&config, session.tokens().clone())?;
        Self::new(config, session, store)
    }
}

impl<S: DocumentStore + Clone> AppState<S> {
    /// Wire the dashboard around an existing session and document store.
    ///
    /// # Errors
    ///
    /// Returns an error if the auth client cannot be built.
    pub fn new(
        config: DashboardConfig,
        session: SessionState,
        store: S,
    ) -> Result<Self, DashboardError> {
        let client = AuthClient::new(&config)?;
        let gate = AuthGate::new(client, session.clone());
        let feed = ProductFeed::new(store.clone(), config.products_collection.clone());
        let commands = ProductCommands::new(store, config.products_collection.clone());

        info!(
            api = %config.api_base_url,
            collection = %config.products_collection,
            persistent_tokens = session.tokens().is_persistent(),
            "Dashboard state initialized"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                session,
                gate,
                feed,
                commands,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.inner.session
    }

    #[must_use]
    pub fn gate(&self) -> &AuthGate {
        &self.inner.gate
    }

    #[must_use]
    pub fn feed(&self) -> &ProductFeed<S> {
        &self.inner.feed
    }

    #[must_use]
    pub fn commands(&self) -> &ProductCommands<S> {
        &self.inner.commands
    }

    /// Route guard backed by this state's auth gate.
    #[must_use]
    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(self.inner.gate.clone())
    }

    #[must_use]
    pub fn login_view(&self) -> LoginView {
        LoginView::new(self.inner.gate.clone())
    }

    /// Mount the products view. Subscribes to the products collection.
    #[must_use]
    pub fn products_view(&self, authorized: &Authorized) -> ProductsView<S> {
        ProductsView::mount(authorized, &self.inner.feed, self.inner.commands.clone())
    }

    /// Mount the analytics view. Subscribes to the products collection.
    #[must_use]
    pub fn analytics_view(&self, authorized: &Authorized) -> AnalyticsView {
        AnalyticsView::mount(authorized, &self.inner.feed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::storage::MemoryStorage;

    fn session() -> SessionState {
        SessionState::new(TokenStore::new(Arc::new(MemoryStorage::new())))
    }

    #[test]
    fn test_starts_unauthenticated_even_with_stored_marker() {
        let storage = Arc::new(MemoryStorage::new());
        let tokens = TokenStore::new(storage);
        tokens.set_login_state(true);

        let state = SessionState::new(tokens);
        assert!(!state.is_authenticated());
        assert_eq!(state.snapshot(), Session::default());
    }

    #[test]
    fn test_login_success_then_clear() {
        let state = session();
        let email = Email::parse("admin@demo.com").unwrap();
        state.login_success(email.clone(), Some(SecretString::from("abc123")));

        assert!(state.is_authenticated());
        assert_eq!(state.user_email(), Some(email));
        assert!(state.tokens().login_state());
        assert_eq!(state.tokens().token().unwrap().expose_secret(), "abc123");

        state.clear();
        assert!(!state.is_authenticated());
        assert_eq!(state.user_email(), None);
        assert!(state.tokens().token().is_none());
        assert!(!state.tokens().login_state());
    }

    #[test]
    fn test_cookie_only_login_keeps_no_token() {
        let state = session();
        state.login_success(Email::parse("admin@demo.com").unwrap(), None);
        assert!(state.is_authenticated());
        assert!(state.tokens().token().is_none());
    }

    #[test]
    fn test_from_config_without_state_path_is_detached() {
        let state = SessionState::from_config(&DashboardConfig::default()).unwrap();
        assert!(!state.tokens().is_persistent());
    }
}
