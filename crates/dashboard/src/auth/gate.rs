//! Auth gate: verifies the session before protected views load.
//!
//! [`AuthGate::check_session`] is the single entry point. It returns an
//! [`Access`] decision; only the `Authorized` arm carries the
//! [`Authorized`] capability that the product feed requires, so a
//! subscription cannot be opened before the check completes.

use grocify_core::Email;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use crate::state::SessionState;

use super::client::AuthClient;
use super::error::AuthError;

/// Where unauthenticated users are sent.
pub const LOGIN_PATH: &str = "/login";

/// Where users land after logging in.
pub const DEFAULT_LANDING_PATH: &str = "/dashboard/products";

/// Proof that the backend confirmed the session.
///
/// Only [`AuthGate`] can create one.
#[derive(Debug, Clone)]
pub struct Authorized {
    _private: (),
}

impl Authorized {
    pub(crate) const fn issue() -> Self {
        Self { _private: () }
    }
}

/// Outcome of a session check.
#[derive(Debug, Clone)]
pub enum Access {
    /// The session is valid; protected content may load.
    Authorized(Authorized),
    /// The session is missing or invalid; local auth state was cleared
    /// and the caller must redirect to [`LOGIN_PATH`].
    Unauthorized,
}

impl Access {
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }

    /// The capability, if access was granted.
    #[must_use]
    pub fn into_authorized(self) -> Option<Authorized> {
        match self {
            Self::Authorized(authorized) => Some(authorized),
            Self::Unauthorized => None,
        }
    }
}

/// Gate in front of every protected view.
#[derive(Clone)]
pub struct AuthGate {
    client: AuthClient,
    session: SessionState,
}

impl AuthGate {
    #[must_use]
    pub const fn new(client: AuthClient, session: SessionState) -> Self {
        Self { client, session }
    }

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// Verify the session with the auth backend.
    ///
    /// Any failure (network error, rejection, `authenticated: false`)
    /// clears the stored token, the login marker and the in-memory
    /// session before returning [`Access::Unauthorized`].
    #[instrument(skip(self))]
    pub async fn check_session(&self) -> Access {
        match self.client.check(self.session.auth_headers()).await {
            Ok(()) => {
                self.session.mark_verified();
                info!("Session verified");
                Access::Authorized(Authorized::issue())
            }
            Err(e) => {
                warn!(error = %e, "Session check failed, clearing auth state");
                self.session.clear();
                Access::Unauthorized
            }
        }
    }

    /// Log in with form credentials.
    ///
    /// On success the token (if any) and login marker are persisted and
    /// the session is marked authenticated. On failure nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] or [`AuthError::MissingPassword`]
    /// for bad input without contacting the backend, otherwise whatever the
    /// backend call returned.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            return Err(AuthError::MissingPassword);
        }

        let token = self.client.login(&email, password).await?;
        info!(email = %email, "Logged in");
        self.session.login_success(email, token);
        Ok(())
    }

    /// Log out.
    ///
    /// Local state is cleared even when the backend call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.client.logout(self.session.auth_headers()).await {
            warn!(error = %e, "Backend logout failed");
        }
        self.session.clear();
        info!("Logged out");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::TokenStore;
    use crate::storage::MemoryStorage;
    use crate::test_support::{
        TEST_EMAIL, TEST_PASSWORD, TEST_TOKEN, spawn_auth_backend, spawn_check_backend,
    };

    async fn gate() -> AuthGate {
        let config = spawn_auth_backend().await;
        let session = SessionState::new(TokenStore::new(Arc::new(MemoryStorage::new())));
        AuthGate::new(AuthClient::new(&config).unwrap(), session)
    }

    #[tokio::test]
    async fn test_check_without_token_is_unauthorized() {
        let gate = gate().await;
        gate.session().tokens().set_login_state(true);

        let access = gate.check_session().await;
        assert!(!access.is_authorized());
        assert!(!gate.session().tokens().login_state());
        assert!(!gate.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_login_then_check_is_authorized() {
        let gate = gate().await;
        gate.login(TEST_EMAIL, &SecretString::from(TEST_PASSWORD))
            .await
            .unwrap();

        let session = gate.session().snapshot();
        assert!(session.is_authenticated);
        assert_eq!(session.user_email.unwrap().as_str(), TEST_EMAIL);
        assert_eq!(
            gate.session().tokens().token().unwrap().expose_secret(),
            TEST_TOKEN
        );

        assert!(gate.check_session().await.is_authorized());
    }

    #[tokio::test]
    async fn test_stale_token_is_cleared() {
        let gate = gate().await;
        gate.session()
            .tokens()
            .set_token(&SecretString::from("expired"));
        gate.session().tokens().set_login_state(true);

        assert!(matches!(gate.check_session().await, Access::Unauthorized));
        assert!(gate.session().tokens().token().is_none());
        assert!(!gate.session().tokens().login_state());
    }

    #[tokio::test]
    async fn test_wrong_password_surfaces_server_message() {
        let gate = gate().await;
        let err = gate
            .login(TEST_EMAIL, &SecretString::from("wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert!(!gate.session().is_authenticated());
        assert!(gate.session().tokens().token().is_none());
    }

    #[tokio::test]
    async fn test_login_input_validated_locally() {
        let gate = gate().await;
        assert!(matches!(
            gate.login("not-an-email", &SecretString::from("x")).await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            gate.login(TEST_EMAIL, &SecretString::from("")).await,
            Err(AuthError::MissingPassword)
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_state() {
        let gate = gate().await;
        gate.login(TEST_EMAIL, &SecretString::from(TEST_PASSWORD))
            .await
            .unwrap();

        gate.logout().await;
        assert!(!gate.session().is_authenticated());
        assert!(gate.session().tokens().token().is_none());
        assert!(!gate.check_session().await.is_authorized());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unauthorized() {
        let config = crate::config::DashboardConfig {
            api_base_url: url::Url::parse("http://127.0.0.1:9").unwrap(),
            ..crate::config::DashboardConfig::default()
        };
        let session = SessionState::new(TokenStore::new(Arc::new(MemoryStorage::new())));
        session.tokens().set_token(&SecretString::from("abc"));
        let gate = AuthGate::new(AuthClient::new(&config).unwrap(), session);

        assert!(!gate.check_session().await.is_authorized());
        assert!(gate.session().tokens().token().is_none());
    }

    async fn gate_with_check_body(body: &'static str) -> AuthGate {
        let config = spawn_check_backend(body).await;
        let session = SessionState::new(TokenStore::new(Arc::new(MemoryStorage::new())));
        session.tokens().set_token(&SecretString::from("stale"));
        session.tokens().set_login_state(true);
        AuthGate::new(AuthClient::new(&config).unwrap(), session)
    }

    #[tokio::test]
    async fn test_ok_with_authenticated_false_clears_state() {
        let gate = gate_with_check_body(r#"{"authenticated": false}"#).await;

        assert!(matches!(gate.check_session().await, Access::Unauthorized));
        assert!(gate.session().tokens().token().is_none());
        assert!(!gate.session().tokens().login_state());
        assert!(!gate.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_ok_without_explicit_true_is_unauthorized() {
        for body in ["", "{}", "<html>login</html>", r#"{"authenticated": "no"}"#] {
            let gate = gate_with_check_body(body).await;

            assert!(
                matches!(gate.check_session().await, Access::Unauthorized),
                "body {body:?} was accepted"
            );
            assert!(gate.session().tokens().token().is_none());
            assert!(!gate.session().tokens().login_state());
        }
    }

    #[tokio::test]
    async fn test_ok_with_authenticated_true_is_authorized() {
        let gate = gate_with_check_body(r#"{"authenticated": true}"#).await;
        assert!(gate.check_session().await.is_authorized());
        assert!(gate.session().tokens().login_state());
    }
}
