//! Authentication error types.

use grocify_core::EmailError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while talking to the auth backend.
///
/// All of these collapse to "not authenticated" at the gate; the detail is
/// kept for logging and for the login form's message.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request never got a response (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("auth backend rejected request (HTTP {status})")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Human-readable message from the response body, if any.
        message: Option<String>,
    },

    /// The session check succeeded but reported `authenticated: false`.
    #[error("session is not authenticated")]
    NotAuthenticated,

    /// The login email is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The login password is empty.
    #[error("password is required")]
    MissingPassword,

    /// An endpoint URL could not be built.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AuthError {
    /// Server-provided message for a rejected request.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::Rejected {
            status: 401,
            message: Some("Invalid credentials".to_string()),
        };
        assert_eq!(err.to_string(), "auth backend rejected request (HTTP 401)");
        assert_eq!(err.server_message(), Some("Invalid credentials"));

        assert_eq!(
            AuthError::NotAuthenticated.to_string(),
            "session is not authenticated"
        );
        assert_eq!(AuthError::MissingPassword.server_message(), None);
    }
}
