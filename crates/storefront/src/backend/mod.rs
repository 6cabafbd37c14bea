//! Clients for the backend HTTP API.
//!
//! # Architecture
//!
//! - [`ApiClient`] is the thin JSON wrapper every call goes through: it joins
//!   paths onto the configured base URL, attaches the bearer credential when
//!   one is given, and turns non-success statuses into [`ApiError::Status`].
//! - The backend is the source of truth for products and orders; the only
//!   local state is the `moka` product cache (5 minute TTL).
//!
//! # APIs
//!
//! - [`CatalogClient`] - product listing, search and lookup
//! - [`HttpOrderApi`] - order creation (behind the [`OrderApi`] trait)
//! - [`AuthClient`] - username/password login returning a bearer token
//!
//! # Example
//!
//! ```rust,ignore
//! let api = ApiClient::new(&config.api)?;
//! let catalog = CatalogClient::new(api.clone());
//!
//! let page = catalog.list_products(0, 12).await?;
//! let product = catalog.get_product(page.content[0].id).await?;
//! ```

mod auth;
mod catalog;
mod orders;

pub use auth::{AuthClient, LoginResponse};
pub use catalog::CatalogClient;
pub use orders::{HttpOrderApi, OrderApi, OrderApiError};

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;
use crate::models::Credential;

/// Maximum number of body characters kept in errors and logs.
const BODY_SNIPPET_CHARS: usize = 500;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Start of the response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the backend reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Authenticated JSON client for the backend API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Resolve a path relative to the API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success,
    /// or the body is not the expected JSON.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        credential: Option<&Credential>,
    ) -> Result<T, ApiError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        self.execute(self.request(Method::GET, url, credential), None::<&()>)
            .await
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        credential: Option<&Credential>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.execute(self.request(Method::POST, url, credential), Some(body))
            .await
    }

    /// `PUT` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn put<B, T>(
        &self,
        path: &str,
        body: &B,
        credential: Option<&Credential>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        self.execute(self.request(Method::PUT, url, credential), Some(body))
            .await
    }

    /// `DELETE` a resource. An empty response body decodes as JSON `null`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&Credential>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.execute(self.request(Method::DELETE, url, credential), None::<&()>)
            .await
    }

    fn request(&self, method: Method, url: Url, credential: Option<&Credential>) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");

        match credential {
            Some(credential) => builder.bearer_auth(credential.token().expose_secret()),
            None => builder,
        }
    }

    /// Send a request and decode the response.
    async fn execute<B, T>(&self, builder: RequestBuilder, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = match body {
            Some(body) => builder.body(serde_json::to_vec(body)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                url = %url,
                body = %snippet(&response_text),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: snippet(&response_text),
            });
        }

        let text = if response_text.trim().is_empty() {
            "null"
        } else {
            response_text.as_str()
        };

        serde_json::from_str(text).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %snippet(&response_text),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> ApiClient {
        let config =
            ApiConfig::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            body: "out of stock".to_string(),
        };
        assert_eq!(err.to_string(), "API returned 400 Bad Request: out of stock");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_snippet_truncates() {
        let long = "x".repeat(BODY_SNIPPET_CHARS * 2);
        assert_eq!(snippet(&long).len(), BODY_SNIPPET_CHARS);
    }

    #[tokio::test]
    async fn test_get_with_query_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/things"))
            .and(query_param("page", "2"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::new("tok-123");
        let value: Value = client
            .get("things", &[("page", "2")], Some(&credential))
            .await
            .unwrap();

        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/things"))
            .and(body_json(json!({"name": "widget"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let value: Value = client
            .post("/things", &json!({"name": "widget"}), None)
            .await
            .unwrap();

        assert_eq!(value["id"], 1);
    }

    #[tokio::test]
    async fn test_put_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/things/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "new"})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/things/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let updated: Value = client
            .put("things/1", &json!({"name": "new"}), None)
            .await
            .unwrap();
        let deleted: Option<Value> = client.delete("things/1", None).await.unwrap();

        assert_eq!(updated["name"], "new");
        assert!(deleted.is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get::<Value>("missing", &[], None).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("no such thing"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get::<Value>("broken", &[], None).await.unwrap_err();

        assert!(matches!(err, ApiError::Parse(_)));
    }
}
