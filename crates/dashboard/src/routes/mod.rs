//! Dashboard routes and sidebar navigation.

/// Login page.
pub const LOGIN: &str = "/login";
/// Product management page.
pub const PRODUCTS: &str = "/dashboard/products";
/// Analytics page.
pub const ANALYTICS: &str = "/dashboard/analytics";

const DASHBOARD_PREFIX: &str = "/dashboard";

/// A known dashboard route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Products,
    Analytics,
    /// Any other path, kept as given.
    Other(String),
}

impl Route {
    /// Parse a path, ignoring any query string, fragment or trailing slash.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        match trimmed {
            LOGIN => Self::Login,
            PRODUCTS => Self::Products,
            ANALYTICS => Self::Analytics,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Login => LOGIN,
            Self::Products => PRODUCTS,
            Self::Analytics => ANALYTICS,
            Self::Other(path) => path,
        }
    }

    /// Whether the route requires a verified session.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        is_protected_path(self.path())
    }
}

/// Whether `path` lies under `/dashboard`.
#[must_use]
pub fn is_protected_path(path: &str) -> bool {
    path.strip_prefix(DASHBOARD_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// A sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub name: &'static str,
    pub route: Route,
    /// Whether this entry is the current page.
    pub active: bool,
}

/// Sidebar entries, with the current page marked.
#[must_use]
pub fn nav_items(current: &Route) -> [NavItem; 2] {
    [("Products", Route::Products), ("Analytics", Route::Analytics)].map(|(name, route)| {
        NavItem {
            name,
            active: &route == current,
            route,
        }
    })
}
