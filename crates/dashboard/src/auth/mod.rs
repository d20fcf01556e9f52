//! Authentication for the dashboard.
//!
//! - [`TokenStore`] persists the bearer token and login flag across runs
//! - [`AuthClient`] talks to the external auth backend (`/api/auth/*`)
//! - [`AuthGate`] decides whether protected views may load, and owns the
//!   login/logout flows
//!
//! The bearer token is the only credential used to build auth headers. The
//! in-memory session flag is never trusted on its own: every protected
//! view goes through [`AuthGate::check_session`] first.

pub mod client;
pub mod error;
pub mod gate;
pub mod token_store;

pub use client::AuthClient;
pub use error::AuthError;
pub use gate::{Access, AuthGate, Authorized, DEFAULT_LANDING_PATH, LOGIN_PATH};
pub use token_store::{LOGIN_STATE_KEY, TOKEN_KEY, TokenStore};
