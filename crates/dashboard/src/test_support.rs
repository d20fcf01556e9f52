//! Fake backends for unit tests.

#![allow(clippy::unwrap_used)]

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use url::Url;

use crate::config::DashboardConfig;

pub const TEST_EMAIL: &str = "admin@demo.com";
pub const TEST_PASSWORD: &str = "grocify";
pub const TEST_TOKEN: &str = "test-token";

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == TEST_EMAIL && body["password"] == TEST_PASSWORD {
        Json(json!({ "token": TEST_TOKEN })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn check(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {TEST_TOKEN}");
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if authorized {
        Json(json!({ "authenticated": true })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Not authenticated" })),
        )
            .into_response()
    }
}

async fn logout() -> StatusCode {
    StatusCode::OK
}

/// Start a fake auth backend and return a config pointing at it.
pub async fn spawn_auth_backend() -> DashboardConfig {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/check", get(check))
        .route("/api/auth/logout", post(logout));
    serve(app).await
}

/// Start a backend whose session check always answers `200 OK` with `body`.
pub async fn spawn_check_backend(body: &'static str) -> DashboardConfig {
    let app = Router::new().route(
        "/api/auth/check",
        get(move || async move { (StatusCode::OK, body) }),
    );
    serve(app).await
}

async fn serve(app: Router) -> DashboardConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    DashboardConfig {
        api_base_url: Url::parse(&format!("http://{addr}")).unwrap(),
        ..DashboardConfig::default()
    }
}
