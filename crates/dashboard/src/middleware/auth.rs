//! Route guard for protected dashboard paths.
//!
//! Every navigation goes through [`RouteGuard::enter`]. Paths under
//! `/dashboard` run the auth gate once and either proceed with the
//! [`Authorized`] capability or redirect to the login page. Other paths
//! proceed without a check.

use tracing::{debug, instrument};

use crate::auth::{Access, AuthGate, Authorized, LOGIN_PATH};
use crate::routes::Route;

/// What to do after a navigation request.
#[derive(Debug, Clone)]
pub enum Navigation {
    /// Render `route`. Protected routes carry the capability.
    Proceed {
        route: Route,
        access: Option<Authorized>,
    },
    /// Go to this path instead.
    Redirect(&'static str),
}

impl Navigation {
    #[must_use]
    pub const fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::Redirect(to) => Some(*to),
            Self::Proceed { .. } => None,
        }
    }
}

/// Guards protected routes with the auth gate.
#[derive(Clone)]
pub struct RouteGuard {
    gate: AuthGate,
}

impl RouteGuard {
    #[must_use]
    pub const fn new(gate: AuthGate) -> Self {
        Self { gate }
    }

    /// Resolve a navigation to `path`.
    #[instrument(skip(self))]
    pub async fn enter(&self, path: &str) -> Navigation {
        let route = Route::from_path(path);
        if !route.is_protected() {
            return Navigation::Proceed {
                route,
                access: None,
            };
        }

        match self.gate.check_session().await {
            Access::Authorized(authorized) => Navigation::Proceed {
                route,
                access: Some(authorized),
            },
            Access::Unauthorized => {
                debug!(path, "Redirecting to login");
                Navigation::Redirect(LOGIN_PATH)
            }
        }
    }
}
