//! HTTP document store: REST mutations plus a server-sent-events feed.
//!
//! # Protocol
//!
//! All paths are relative to the configured store URL:
//!
//! - `POST collections/{collection}/documents` - body is the field map,
//!   response is `{"id": "..."}`
//! - `PATCH collections/{collection}/documents/{id}` - merge fields;
//!   `404` if the document does not exist
//! - `DELETE collections/{collection}/documents/{id}`
//! - `GET collections/{collection}/listen` - `text/event-stream` of
//!   `event: snapshot` (data: [`Snapshot`] JSON) and `event: error`
//!   (data: `{"message": "..."}`) events
//!
//! Every request carries the bearer headers from the [`TokenStore`].

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::StreamExt;
use grocify_core::Fields;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::auth::TokenStore;

use super::{DocumentStore, Snapshot, SnapshotStream, StoreError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP document store client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpDocumentStore {
    inner: Arc<HttpStoreInner>,
}

struct HttpStoreInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: TokenStore,
    /// Applied to mutations only; the listen stream stays open.
    request_timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpDocumentStore {
    /// Create a store client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize, or if
    /// `base_url` cannot carry a path.
    pub fn new(
        base_url: Url,
        tokens: TokenStore,
        request_timeout: Option<Duration>,
    ) -> Result<Self, StoreError> {
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidPath(base_url.to_string()));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpStoreInner {
                client,
                base_url,
                tokens,
                request_timeout,
            }),
        })
    }

    /// URL of `collections/{collection}/{tail...}` under the base URL.
    fn collection_url(&self, collection: &str, tail: &[&str]) -> Result<Url, StoreError> {
        if collection.is_empty() || tail.iter().any(|s| s.is_empty()) {
            return Err(StoreError::InvalidPath(format!(
                "{collection}/{}",
                tail.join("/")
            )));
        }

        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidPath(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push("collections")
            .push(collection)
            .extend(tail);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, url)
            .headers(self.inner.tokens.auth_headers());
        match self.inner.request_timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }
}

impl DocumentStore for HttpDocumentStore {
    #[instrument(skip(self, fields))]
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let url = self.collection_url(collection, &["documents"])?;
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&fields)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_status(status, response, collection).await);
        }

        let body = response.text().await?;
        let created: CreatedResponse = serde_json::from_str(&body)
            .map_err(|e| StoreError::Parse(format!("Failed to parse add response: {e}")))?;
        debug!(id = %created.id, "Document added");
        Ok(created.id)
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = self.collection_url(collection, &["documents", id])?;
        let response = self
            .request(reqwest::Method::PATCH, url)
            .json(&fields)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_status(status, response, id).await);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.collection_url(collection, &["documents", id])?;
        let response = self.request(reqwest::Method::DELETE, url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_status(status, response, id).await);
        }
        Ok(())
    }

    fn watch(&self, collection: &str) -> SnapshotStream {
        let url = self.collection_url(collection, &["listen"]);
        let request = url.map(|url| {
            self.inner
                .client
                .get(url)
                .headers(self.inner.tokens.auth_headers())
                .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
        });
        let collection = collection.to_owned();

        Box::pin(stream! {
            let response = match request {
                Ok(request) => request.send().await,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    yield Err(StoreError::Http(e));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                yield Err(error_status(status, response, &collection).await);
                return;
            }
            debug!(collection = %collection, "Listening for snapshots");

            let mut buffer: Vec<u8> = Vec::new();
            let mut byte_stream = std::pin::pin!(response.bytes_stream());

            while let Some(chunk_result) = byte_stream.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

                        // Process complete SSE events
                        while let Some(raw) = extract_sse_event(&mut buffer) {
                            let event = match String::from_utf8(raw) {
                                Ok(event) => event,
                                Err(e) => {
                                    yield Err(StoreError::Parse(format!("Invalid UTF-8: {e}")));
                                    continue;
                                }
                            };
                            if let Some(parsed) = parse_sse_event(&event) {
                                yield parsed;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(collection = %collection, error = %e, "Snapshot stream broke");
                        yield Err(StoreError::Http(e));
                        return;
                    }
                }
            }
        })
    }
}

/// Map an error status to a [`StoreError`]. `404` becomes
/// [`StoreError::NotFound`] carrying `subject`.
async fn error_status(
    status: reqwest::StatusCode,
    response: reqwest::Response,
    subject: &str,
) -> StoreError {
    if status == reqwest::StatusCode::NOT_FOUND {
        return StoreError::NotFound(subject.to_owned());
    }

    match response.text().await {
        Ok(body) => {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            StoreError::Rejected {
                status: status.as_u16(),
                message,
            }
        }
        Err(e) => StoreError::Http(e),
    }
}

/// Extract a complete SSE event from the buffer.
///
/// Returns `Some(event)` if a complete event was found (and removes it from
/// the buffer), or `None` if no complete event is available yet.
fn extract_sse_event(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let idx = buffer.windows(2).position(|w| w == b"\n\n")?;
    let mut event: Vec<u8> = buffer.drain(..idx + 2).collect();
    event.truncate(idx);
    Some(event)
}

/// Parse one SSE event into a snapshot or feed error.
///
/// Comments, keep-alives and unknown event types yield `None`.
fn parse_sse_event(event: &str) -> Option<Result<Snapshot, StoreError>> {
    let mut kind = None;
    let mut data = Vec::new();

    for line in event.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = line
            .split_once(':')
            .map_or((line, ""), |(f, v)| (f, v.strip_prefix(' ').unwrap_or(v)));
        match field {
            "event" => kind = Some(value),
            "data" => data.push(value),
            _ => {}
        }
    }

    if data.is_empty() {
        return None;
    }
    let data = data.join("\n");

    match kind.unwrap_or("message") {
        "snapshot" | "message" => Some(
            serde_json::from_str::<Snapshot>(&data)
                .map_err(|e| StoreError::Parse(format!("Failed to parse snapshot: {e}"))),
        ),
        "error" => {
            let message = serde_json::from_str::<ErrorBody>(&data)
                .map(|e| e.message)
                .unwrap_or(data);
            Some(Err(StoreError::Feed(message)))
        }
        _ => None,
    }
}
