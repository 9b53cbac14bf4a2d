//! HTTP implementation of [`RemoteStore`] over the catalog/borrow REST API.
//!
//! Client construction follows one shared policy: explicit connect/read
//! timeouts, an identifying User-Agent, gzip, and an env-proxy fallback for
//! sandboxes where system proxy lookup panics.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Proxy, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::wire::{self, DeleteResponse, InsertResponse};
use super::{RemoteStore, StoreError};
use crate::catalog::{Book, BookForm, BookId};
use crate::loans::{BorrowDraft, BorrowRecord, RecordId};
use crate::session::Token;
use crate::user_agent;

/// Default connect timeout for store requests.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total request timeout for store requests.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// REST client for the catalog/borrow API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base: Url,
}

impl HttpStore {
    /// Creates a store client with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUrl`] when `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_timeouts(base_url, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS)
    }

    /// Creates a store client with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUrl`] for an unusable base URL and
    /// [`StoreError::Transport`] when the HTTP client cannot be built.
    pub fn with_timeouts(
        base_url: &str,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let base = parse_base_url(base_url)?;
        let client = build_client(base.as_str(), connect_timeout_secs, read_timeout_secs)?;
        Ok(Self { client, base })
    }

    /// The API root every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::invalid_url(self.base.as_str()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and maps non-2xx answers to errors.
    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|error| transport_error(url, error))?;
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "store responded");

        if status == StatusCode::UNAUTHORIZED {
            return Err(StoreError::unauthorized(url.as_str()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let fallback = status.canonical_reason().unwrap_or("request failed");
            return Err(StoreError::rejected(
                url.as_str(),
                status.as_u16(),
                wire::error_message(&body, fallback),
            ));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, StoreError> {
        let response = self.send(request, url).await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|error| transport_error(url, error))?;
        serde_json::from_slice(&body)
            .map_err(|error| StoreError::decode(url.as_str(), status, error.to_string()))
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    #[instrument(level = "debug", skip(self))]
    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        let url = self.endpoint(&["books"])?;
        self.send_json(self.client.get(url.clone()), &url).await
    }

    #[instrument(level = "debug", skip(self, token), fields(book_id = %id))]
    async fn get_book(&self, id: &BookId, token: Option<&Token>) -> Result<Book, StoreError> {
        let url = self.endpoint(&["books", id.as_str()])?;
        let mut request = self.client.get(url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token.expose());
        }
        self.send_json(request, &url).await
    }

    #[instrument(level = "debug", skip(self, book, token), fields(name = %book.name))]
    async fn create_book(&self, book: &BookForm, token: &Token) -> Result<BookId, StoreError> {
        let url = self.endpoint(&["books"])?;
        let request = self
            .client
            .post(url.clone())
            .bearer_auth(token.expose())
            .json(book);
        let inserted: InsertResponse = self.send_json(request, &url).await?;
        Ok(BookId::new(inserted.inserted_id))
    }

    #[instrument(level = "debug", skip(self, book, token), fields(book_id = %id))]
    async fn update_book(
        &self,
        id: &BookId,
        book: &BookForm,
        token: &Token,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(&["books", id.as_str()])?;
        let request = self
            .client
            .put(url.clone())
            .bearer_auth(token.expose())
            .json(book);
        self.send(request, &url).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, token))]
    async fn list_borrows(&self, email: &str, token: &Token) -> Result<Vec<BorrowRecord>, StoreError> {
        let url = self.endpoint(&["borrow", email])?;
        let request = self.client.get(url.clone()).bearer_auth(token.expose());
        self.send_json(request, &url).await
    }

    #[instrument(level = "debug", skip(self, draft, token), fields(book_id = %draft.book_id))]
    async fn create_borrow(&self, draft: &BorrowDraft, token: &Token) -> Result<RecordId, StoreError> {
        let url = self.endpoint(&["borrow"])?;
        let request = self
            .client
            .post(url.clone())
            .bearer_auth(token.expose())
            .json(draft);
        let inserted: InsertResponse = self.send_json(request, &url).await?;
        Ok(RecordId::new(inserted.inserted_id))
    }

    #[instrument(level = "debug", skip(self, token), fields(record_id = %id))]
    async fn delete_borrow(&self, id: &RecordId, token: &Token) -> Result<u64, StoreError> {
        let url = self.endpoint(&["borrow", id.as_str()])?;
        let request = self.client.delete(url.clone()).bearer_auth(token.expose());
        let deleted: DeleteResponse = self.send_json(request, &url).await?;
        Ok(deleted.deleted_count)
    }
}

fn transport_error(url: &Url, error: reqwest::Error) -> StoreError {
    if error.is_timeout() {
        StoreError::timeout(url.as_str())
    } else {
        StoreError::transport(url.as_str(), error)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, StoreError> {
    let url = Url::parse(raw.trim()).map_err(|_| StoreError::invalid_url(raw))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(StoreError::invalid_url(raw));
    }
    Ok(url)
}

/// Whether the client may consult the platform's proxy settings.
#[derive(Debug, Clone, Copy)]
enum ProxyLookup {
    System,
    EnvironmentOnly,
}

/// Builds the shared client.
///
/// Some restricted sandboxes panic inside the system proxy lookup; the
/// second attempt skips it and only honours the proxy environment variables.
fn build_client(
    base_url: &str,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> Result<Client, StoreError> {
    let timeouts = (
        Duration::from_secs(connect_timeout_secs),
        Duration::from_secs(read_timeout_secs),
    );
    let built = match attempt_build(timeouts, ProxyLookup::System) {
        Some(built) => built,
        None => {
            warn!("system proxy lookup panicked; building store client from proxy env vars");
            attempt_build(timeouts, ProxyLookup::EnvironmentOnly).ok_or_else(|| {
                StoreError::transport(base_url, "HTTP client construction panicked")
            })?
        }
    };
    built.map_err(|error| StoreError::transport(base_url, error))
}

/// `None` when the builder panicked.
fn attempt_build(
    (connect, read): (Duration, Duration),
    lookup: ProxyLookup,
) -> Option<reqwest::Result<Client>> {
    catch_unwind(AssertUnwindSafe(|| {
        let builder = Client::builder()
            .connect_timeout(connect)
            .timeout(read)
            .user_agent(user_agent::default_store_user_agent())
            .gzip(true);
        let builder = match lookup {
            ProxyLookup::System => builder,
            ProxyLookup::EnvironmentOnly => with_env_proxies(builder.no_proxy()),
        };
        builder.build()
    }))
    .ok()
}

fn with_env_proxies(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) =
        proxy_from_env(&["HTTPS_PROXY", "https_proxy"]).and_then(|url| Proxy::https(url.as_str()).ok())
    {
        builder = builder.proxy(proxy);
    }
    if let Some(proxy) =
        proxy_from_env(&["HTTP_PROXY", "http_proxy"]).and_then(|url| Proxy::http(url.as_str()).ok())
    {
        builder = builder.proxy(proxy);
    }
    builder
}

/// First non-blank value among `names`, then `ALL_PROXY`.
fn proxy_from_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .chain(&["ALL_PROXY", "all_proxy"])
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
