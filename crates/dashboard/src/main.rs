//! Grocify dashboard monitor.
//!
//! Headless front end for the dashboard library: verifies the session (or
//! logs in with `GROCIFY_LOGIN_EMAIL` / `GROCIFY_LOGIN_PASSWORD`), mounts
//! the analytics view and logs fresh statistics every time the products
//! collection changes. Stops on Ctrl+C or when the feed ends.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use grocify_dashboard::config::DashboardConfig;
use grocify_dashboard::middleware::Navigation;
use grocify_dashboard::routes;
use grocify_dashboard::state::AppState;
use grocify_dashboard::telemetry::init_tracing;
use grocify_dashboard::views::LoginOutcome;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = init_tracing(&DashboardConfig::default());
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    let _ = init_tracing(&config);

    let state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialize dashboard");
            return ExitCode::FAILURE;
        }
    };

    let guard = state.route_guard();
    let mut navigation = guard.enter(routes::ANALYTICS).await;

    if navigation.redirect_target().is_some() {
        let (Ok(email), Ok(password)) = (
            std::env::var("GROCIFY_LOGIN_EMAIL"),
            std::env::var("GROCIFY_LOGIN_PASSWORD"),
        ) else {
            error!("Not logged in and no GROCIFY_LOGIN_EMAIL/GROCIFY_LOGIN_PASSWORD set");
            return ExitCode::FAILURE;
        };

        match state.login_view().submit(&email, &password).await {
            LoginOutcome::Redirect(_) => navigation = guard.enter(routes::ANALYTICS).await,
            LoginOutcome::Failed(message) => {
                error!(%message, "Login failed");
                return ExitCode::FAILURE;
            }
        }
    }

    let Navigation::Proceed {
        access: Some(authorized),
        ..
    } = navigation
    else {
        error!("Session was not accepted by the auth backend");
        return ExitCode::FAILURE;
    };

    let mut view = state.analytics_view(&authorized);
    info!("Watching products, press Ctrl+C to stop");

    loop {
        tokio::select! {
            stats = view.next_stats() => {
                let Some(stats) = stats else {
                    if let Some(e) = view.feed_status().error() {
                        warn!(error = %e, "Product feed stopped");
                    }
                    break;
                };
                info!(
                    total = stats.total,
                    active = stats.by_status.active,
                    inactive = stats.by_status.inactive,
                    categories = stats.by_category.len(),
                    "Product statistics"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    view.unmount();
    ExitCode::SUCCESS
}
