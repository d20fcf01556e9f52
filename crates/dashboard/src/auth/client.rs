//! HTTP client for the external auth backend.
//!
//! Endpoints, relative to the configured API base URL:
//!
//! - `POST /api/auth/login` with `{email, password}`; success may carry a
//!   `token`, failure may carry a `message`
//! - `GET /api/auth/check`; a success status with `{"authenticated": true}`
//!   means the session is valid
//! - `POST /api/auth/logout`
//!
//! The backend may use a session cookie, a bearer token, or both. The
//! client keeps a cookie jar and callers pass the bearer headers
//! explicitly.

use std::sync::Arc;

use grocify_core::Email;
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::DashboardConfig;

use super::error::AuthError;

const LOGIN_PATH: &str = "/api/auth/login";
const CHECK_PATH: &str = "/api/auth/check";
const LOGOUT_PATH: &str = "/api/auth/logout";

/// Auth backend client.
///
/// Cheap to clone; clones share the connection pool and cookie jar.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    login_url: Url,
    check_url: Url,
    logout_url: Url,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Body of a successful session check. The field is required.
#[derive(Debug, Deserialize)]
struct CheckResponse {
    authenticated: bool,
}

impl AuthClient {
    /// Create a client for the backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL cannot be built or the HTTP
    /// client fails to initialize.
    pub fn new(config: &DashboardConfig) -> Result<Self, AuthError> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            inner: Arc::new(AuthClientInner {
                client,
                login_url: config.api_url(LOGIN_PATH)?,
                check_url: config.api_url(CHECK_PATH)?,
                logout_url: config.api_url(LOGOUT_PATH)?,
            }),
        })
    }

    /// Exchange credentials for a session.
    ///
    /// Returns the bearer token when the backend issues one. Cookie-only
    /// backends return `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] for a non-success status (with the
    /// server's message, if any) and [`AuthError::Network`] when the
    /// backend cannot be reached.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Option<SecretString>, AuthError> {
        let request = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };

        let response = self
            .inner
            .client
            .post(self.inner.login_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status, response).await);
        }

        // A success body we cannot read still means the login went through.
        let body = response.text().await.unwrap_or_default();
        let parsed: LoginResponse = serde_json::from_str(&body).unwrap_or_default();
        debug!(has_token = parsed.token.is_some(), "Login accepted");

        Ok(parsed
            .token
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    /// Ask the backend whether the current session is valid.
    ///
    /// # Errors
    ///
    /// Returns an error unless the backend answers with a success status
    /// and a body of exactly `{"authenticated": true}`. An empty or
    /// unreadable body is [`AuthError::NotAuthenticated`].
    #[instrument(skip(self, headers))]
    pub async fn check(&self, headers: HeaderMap) -> Result<(), AuthError> {
        let response = self
            .inner
            .client
            .get(self.inner.check_url.clone())
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status, response).await);
        }

        let body = response.text().await?;
        match serde_json::from_str::<CheckResponse>(&body) {
            Ok(CheckResponse {
                authenticated: true,
            }) => Ok(()),
            Ok(CheckResponse {
                authenticated: false,
            }) => Err(AuthError::NotAuthenticated),
            Err(e) => {
                warn!(%status, error = %e, "Unreadable session check body");
                Err(AuthError::NotAuthenticated)
            }
        }
    }

    /// End the session on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, headers))]
    pub async fn logout(&self, headers: HeaderMap) -> Result<(), AuthError> {
        let response = self
            .inner
            .client
            .post(self.inner.logout_url.clone())
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status, response).await);
        }
        Ok(())
    }
}

/// Build a [`AuthError::Rejected`] from an error response.
async fn rejected(status: reqwest::StatusCode, response: reqwest::Response) -> AuthError {
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorResponse>(&body).ok())
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty());

    AuthError::Rejected {
        status: status.as_u16(),
        message,
    }
}
