//! REST client for the storefront backend.
//!
//! # Architecture
//!
//! - One `RemoteClient` per app, cloned freely (`Arc` inside)
//! - Every request carries the host identity assertion as the
//!   `X-Init-Data` header; the backend authenticates it in place of a login
//! - In-memory caching via `moka` for catalog responses (5 minute TTL);
//!   cart, favorites, and config are never cached
//! - No retries anywhere; a fixed per-request timeout is the only deadline
//!
//! # Example
//!
//! ```rust,ignore
//! use minishop_client::api::RemoteClient;
//!
//! let client = RemoteClient::new(&config, &host)?;
//!
//! // Fetch the cart and add an item
//! let cart = client.get_cart().await?;
//! client
//!     .add_to_cart(&CartLineInput::new(product_id, 1, &VariantSelector::none()))
//!     .await?;
//! ```

mod cache;
mod endpoints;

pub use endpoints::ProductQuery;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ClientConfig;
use crate::host::HostEnvironment;

use cache::CacheValue;

/// Header carrying the host identity assertion.
const INIT_DATA_HEADER: &str = "X-Init-Data";

const CATALOG_CACHE_CAPACITY: u64 = 1000;
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status. `detail` is the backend's
    /// human-readable message when the error body carried one; `body` is the
    /// raw response text for callers that interpret structured conflicts.
    #[error("server error {status}: {}", detail.as_deref().unwrap_or("(no detail)"))]
    Server {
        status: u16,
        detail: Option<String>,
        body: String,
    },

    /// A 2xx response body that did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err)
        } else {
            Self::Network(err)
        }
    }

    /// The HTTP status for server errors, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's human-readable detail message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Error body shape used by the backend for all 4xx/5xx responses.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

// =============================================================================
// RemoteClient
// =============================================================================

/// Client for the storefront REST API.
///
/// The single point of outbound HTTP communication: attaches the identity
/// assertion on every request, decodes JSON bodies, and maps failures onto
/// [`ApiError`]. Callers decide what to do with errors; nothing here retries.
#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<RemoteClientInner>,
}

struct RemoteClientInner {
    http: reqwest::Client,
    base_url: Url,
    identity: Option<SecretString>,
    catalog_cache: Cache<String, CacheValue>,
}

impl RemoteClient {
    /// Create a new API client bound to the given host environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        host: &dyn HostEnvironment,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(ApiError::Network)?;

        let catalog_cache = Cache::builder()
            .max_capacity(CATALOG_CACHE_CAPACITY)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(RemoteClientInner {
                http,
                base_url: config.api_url.clone(),
                identity: host.identity_assertion(),
                catalog_cache,
            }),
        })
    }

    /// Build the absolute URL for an API path (paths start with `/`).
    fn endpoint(&self, path: &str) -> String {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        format!("{base}{path}")
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self.inner.http.request(method, self.endpoint(path));
        match &self.inner.identity {
            Some(identity) => rb.header(INIT_DATA_HEADER, identity.expose_secret()),
            None => rb,
        }
    }

    /// Send a request and decode the JSON response body.
    async fn send<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T, ApiError> {
        let response = rb.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();

        if !status.is_success() {
            return Err(Self::server_error(status, response).await);
        }

        response.json::<T>().await.map_err(ApiError::from_transport)
    }

    /// Turn a non-2xx response into `ApiError::Server`, pulling the
    /// backend's `{"detail": ...}` message out of the body when present.
    async fn server_error(status: StatusCode, response: reqwest::Response) -> ApiError {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.detail);
        ApiError::Server {
            status: status.as_u16(),
            detail,
            body,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.builder(Method::GET, path)).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.send(self.builder(Method::GET, path).query(query)).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.send(self.builder(Method::POST, path).json(body)).await
    }

    /// POST with an empty body (toggle/validate style endpoints).
    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.builder(Method::POST, path)).await
    }

    async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.send(self.builder(Method::PATCH, path).json(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.builder(Method::DELETE, path)).await
    }

    /// POST a multipart form. The content type is left to the transport:
    /// fixing it by hand would drop the boundary parameter the server needs
    /// to parse the body.
    async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        self.send(self.builder(Method::POST, path).multipart(form))
            .await
    }

    // =========================================================================
    // Cache management
    // =========================================================================

    async fn cache_get(&self, key: &str) -> Option<CacheValue> {
        self.inner.catalog_cache.get(key).await
    }

    async fn cache_insert(&self, key: String, value: CacheValue) {
        self.inner.catalog_cache.insert(key, value).await;
    }

    /// Invalidate all cached catalog data (e.g. after an admin upload).
    pub async fn invalidate_catalog(&self) {
        self.inner.catalog_cache.invalidate_all();
        self.inner.catalog_cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Server {
            status: 400,
            detail: Some("Cart item not found".to_string()),
            body: String::new(),
        };
        assert_eq!(err.to_string(), "server error 400: Cart item not found");

        let err = ApiError::Server {
            status: 502,
            detail: None,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "server error 502: (no detail)");

        assert_eq!(ApiError::Timeout.to_string(), "request timed out");
    }

    #[test]
    fn test_error_body_detail_extraction() {
        let parsed: ErrorBody = serde_json::from_str(r#"{"detail": "nope"}"#).unwrap();
        assert_eq!(parsed.detail.as_deref(), Some("nope"));

        // Conflict bodies carry extra fields alongside detail
        let parsed: ErrorBody =
            serde_json::from_str(r#"{"detail": "changed", "removed": [], "adjusted": []}"#)
                .unwrap();
        assert_eq!(parsed.detail.as_deref(), Some("changed"));
    }
}
