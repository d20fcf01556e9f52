//! Login screen controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use secrecy::SecretString;
use tracing::warn;

use crate::auth::{AuthError, AuthGate, DEFAULT_LANDING_PATH};

/// Shown when the backend rejects the login without a message.
pub const LOGIN_FAILED_MESSAGE: &str = "Couldn't log in. Please check your credentials.";

/// Shown when the backend cannot be reached.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Try again.";

/// Result of submitting the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Logged in; navigate here.
    Redirect(&'static str),
    /// Stay on the form and show this message.
    Failed(String),
}

/// Login form state.
pub struct LoginView {
    gate: AuthGate,
    loading: AtomicBool,
    error: Mutex<Option<String>>,
}

/// Clears the loading flag when the submit finishes or is dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LoginView {
    #[must_use]
    pub const fn new(gate: AuthGate) -> Self {
        Self {
            gate,
            loading: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    /// Whether a submit is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Message from the last failed submit.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Submit the form.
    ///
    /// Empty or malformed fields fail without contacting the backend.
    pub async fn submit(&self, email: &str, password: &str) -> LoginOutcome {
        self.set_error(None);
        self.loading.store(true, Ordering::Release);
        let _guard = LoadingGuard(&self.loading);

        let password = SecretString::from(password);
        match self.gate.login(email, &password).await {
            Ok(()) => LoginOutcome::Redirect(DEFAULT_LANDING_PATH),
            Err(e) => {
                warn!(error = %e, "Login failed");
                let message = login_error_message(&e);
                self.set_error(Some(message.clone()));
                LoginOutcome::Failed(message)
            }
        }
    }

    fn set_error(&self, message: Option<String>) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }
}

fn login_error_message(error: &AuthError) -> String {
    match error {
        AuthError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
        AuthError::InvalidEmail(e) => e.to_string(),
        AuthError::MissingPassword => error.to_string(),
        _ => error
            .server_message()
            .unwrap_or(LOGIN_FAILED_MESSAGE)
            .to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::{AuthClient, TokenStore};
    use crate::config::DashboardConfig;
    use crate::state::SessionState;
    use crate::storage::MemoryStorage;
    use crate::test_support::{TEST_EMAIL, TEST_PASSWORD, spawn_auth_backend};

    fn view(config: &DashboardConfig) -> LoginView {
        let session = SessionState::new(TokenStore::new(Arc::new(MemoryStorage::new())));
        LoginView::new(AuthGate::new(AuthClient::new(config).unwrap(), session))
    }

    #[tokio::test]
    async fn test_successful_login_redirects_to_products() {
        let view = view(&spawn_auth_backend().await);
        let outcome = view.submit(TEST_EMAIL, TEST_PASSWORD).await;
        assert_eq!(outcome, LoginOutcome::Redirect("/dashboard/products"));
        assert!(view.error().is_none());
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn test_rejected_login_shows_server_message() {
        let view = view(&spawn_auth_backend().await);
        let outcome = view.submit(TEST_EMAIL, "nope").await;
        assert_eq!(outcome, LoginOutcome::Failed("Invalid credentials".into()));
        assert_eq!(view.error().as_deref(), Some("Invalid credentials"));
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn test_unreachable_backend_shows_network_error() {
        let config = DashboardConfig {
            api_base_url: url::Url::parse("http://127.0.0.1:9").unwrap(),
            ..DashboardConfig::default()
        };
        let outcome = view(&config).submit(TEST_EMAIL, TEST_PASSWORD).await;
        assert_eq!(outcome, LoginOutcome::Failed(NETWORK_ERROR_MESSAGE.into()));
    }

    #[tokio::test]
    async fn test_required_fields() {
        let view = view(&DashboardConfig::default());
        assert_eq!(
            view.submit("", "x").await,
            LoginOutcome::Failed("email is required".into())
        );
        assert_eq!(
            view.submit(TEST_EMAIL, "").await,
            LoginOutcome::Failed("password is required".into())
        );
    }

    #[test]
    fn test_rejection_without_message_uses_fallback() {
        let err = AuthError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(login_error_message(&err), LOGIN_FAILED_MESSAGE);
    }
}
