//! Integration test harness for the Grocify dashboard.
//!
//! Provides fake backends bound to `127.0.0.1:0`:
//!
//! - [`FakeAuthBackend`] - `/api/auth/{login,check,logout}` with session
//!   cookies and (optionally) bearer tokens
//! - [`FakeDocumentServer`] - the HTTP document store protocol, backed by
//!   an in-process [`MemoryDocumentStore`]
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p grocify-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashSet;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use grocify_core::Fields;
use grocify_dashboard::config::DashboardConfig;
use grocify_dashboard::store::{DocumentStore, MemoryDocumentStore, StoreError};
use serde_json::{Value, json};
use url::Url;

/// Credentials accepted by [`FakeAuthBackend`].
pub const ADMIN_EMAIL: &str = "admin@grocify.test";
pub const ADMIN_PASSWORD: &str = "fresh-produce";

/// Name of the session cookie set on login.
pub const SESSION_COOKIE: &str = "grocify_session";

async fn serve(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// A temp-dir path for a file-backed token store.
#[must_use]
pub fn temp_state_path() -> PathBuf {
    std::env::temp_dir().join(format!("grocify-state-{}.json", uuid::Uuid::new_v4()))
}

// =============================================================================
// Auth Backend
// =============================================================================

#[derive(Clone)]
struct AuthState {
    sessions: Arc<Mutex<HashSet<String>>>,
    checks: Arc<AtomicUsize>,
    issue_tokens: bool,
    reject_with_ok: Arc<AtomicBool>,
}

/// Fake auth backend.
pub struct FakeAuthBackend {
    pub url: Url,
    state: AuthState,
}

impl FakeAuthBackend {
    /// Start a backend that returns a bearer token on login (and also sets
    /// a session cookie).
    pub async fn start() -> Self {
        Self::start_with(true).await
    }

    /// Start a backend that only uses the session cookie.
    pub async fn start_cookie_only() -> Self {
        Self::start_with(false).await
    }

    async fn start_with(issue_tokens: bool) -> Self {
        let state = AuthState {
            sessions: Arc::new(Mutex::new(HashSet::new())),
            checks: Arc::new(AtomicUsize::new(0)),
            issue_tokens,
            reject_with_ok: Arc::new(AtomicBool::new(false)),
        };
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/check", get(check))
            .route("/api/auth/logout", post(logout))
            .with_state(state.clone());

        Self {
            url: serve(app).await,
            state,
        }
    }

    /// Number of session checks received.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.state.checks.load(Ordering::SeqCst)
    }

    /// Invalidate every session, as if they all expired.
    pub fn revoke_all(&self) {
        self.state.sessions.lock().unwrap().clear();
    }

    /// Answer invalid sessions with `200 {"authenticated": false}` instead
    /// of `401`.
    pub fn reject_with_ok(&self) {
        self.state.reject_with_ok.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.state.sessions.lock().unwrap().len()
    }

    /// Dashboard config pointing at this backend.
    #[must_use]
    pub fn config(&self) -> DashboardConfig {
        DashboardConfig {
            api_base_url: self.url.clone(),
            ..DashboardConfig::default()
        }
    }
}

fn session_credential(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| pair.trim().strip_prefix(&format!("{SESSION_COOKIE}=")).map(str::to_owned))
}

async fn login(State(state): State<AuthState>, Json(body): Json<Value>) -> Response {
    if body["email"] != ADMIN_EMAIL || body["password"] != ADMIN_PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        )
            .into_response();
    }

    let session_id = uuid::Uuid::new_v4().simple().to_string();
    state.sessions.lock().unwrap().insert(session_id.clone());

    let body = if state.issue_tokens {
        json!({ "ok": true, "token": session_id })
    } else {
        json!({ "ok": true })
    };
    (
        [(
            header::SET_COOKIE,
            format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly"),
        )],
        Json(body),
    )
        .into_response()
}

async fn check(State(state): State<AuthState>, headers: HeaderMap) -> Response {
    state.checks.fetch_add(1, Ordering::SeqCst);
    let valid = session_credential(&headers)
        .is_some_and(|id| state.sessions.lock().unwrap().contains(&id));

    if valid {
        Json(json!({ "authenticated": true })).into_response()
    } else if state.reject_with_ok.load(Ordering::SeqCst) {
        Json(json!({ "authenticated": false })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false })),
        )
            .into_response()
    }
}

async fn logout(State(state): State<AuthState>, headers: HeaderMap) -> StatusCode {
    if let Some(id) = session_credential(&headers) {
        state.sessions.lock().unwrap().remove(&id);
    }
    StatusCode::OK
}

// =============================================================================
// Document Server
// =============================================================================

#[derive(Clone)]
struct DocState {
    store: MemoryDocumentStore,
    auth: Option<AuthState>,
}

impl DocState {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        self.auth.as_ref().is_none_or(|auth| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .is_some_and(|token| auth.sessions.lock().unwrap().contains(token))
        })
    }
}

/// Fake HTTP document store.
pub struct FakeDocumentServer {
    pub url: Url,
    /// Backing store; seed or break it directly.
    pub store: MemoryDocumentStore,
}

impl FakeDocumentServer {
    /// Start a server that accepts any caller.
    pub async fn start() -> Self {
        Self::start_with(None).await
    }

    /// Start a server that only accepts bearer tokens issued by `auth`.
    pub async fn start_guarded(auth: &FakeAuthBackend) -> Self {
        Self::start_with(Some(auth.state.clone())).await
    }

    async fn start_with(auth: Option<AuthState>) -> Self {
        let store = MemoryDocumentStore::new();
        let state = DocState {
            store: store.clone(),
            auth,
        };
        let app = Router::new()
            .route("/collections/{collection}/documents", post(add_document))
            .route(
                "/collections/{collection}/documents/{id}",
                patch(update_document).delete(delete_document),
            )
            .route("/collections/{collection}/listen", get(listen))
            .with_state(state);

        Self {
            url: serve(app).await,
            store,
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Missing or invalid token" })),
    )
        .into_response()
}

fn store_error(err: &StoreError) -> Response {
    let status = match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "message": err.to_string() }))).into_response()
}

async fn add_document(
    State(state): State<DocState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(fields): Json<Fields>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    match state.store.add(&collection, fields).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(e) => store_error(&e),
    }
}

async fn update_document(
    State(state): State<DocState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(fields): Json<Fields>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    match state.store.update(&collection, &id, fields).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error(&e),
    }
}

async fn delete_document(
    State(state): State<DocState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    match state.store.delete(&collection, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error(&e),
    }
}

async fn listen(
    State(state): State<DocState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Sse::new(snapshot_events(&state.store, &collection))
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn snapshot_events(
    store: &MemoryDocumentStore,
    collection: &str,
) -> impl Stream<Item = Result<Event, Infallible>> + use<> {
    store.watch(collection).map(|item| {
        let event = match item {
            Ok(snapshot) => Event::default()
                .event("snapshot")
                .json_data(&snapshot)
                .unwrap(),
            Err(e) => Event::default()
                .event("error")
                .json_data(json!({ "message": e.to_string() }))
                .unwrap(),
        };
        Ok(event)
    })
}
