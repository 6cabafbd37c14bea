//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{ApiClient, ApiError, AuthClient, CatalogClient, HttpOrderApi};
use crate::checkout::CheckoutRegistry;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the backend clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    orders: HttpOrderApi,
    auth: AuthClient,
    checkouts: CheckoutRegistry,
}

impl AppState {
    /// Create a new application state.
    ///
    /// All backend clients share one HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogClient::new(api.clone()),
                orders: HttpOrderApi::new(api.clone()),
                auth: AuthClient::new(api),
                checkouts: CheckoutRegistry::new(),
                config,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Product catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Order service client.
    #[must_use]
    pub fn orders(&self) -> &HttpOrderApi {
        &self.inner.orders
    }

    /// Login client.
    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    /// Per-session checkout submitters.
    #[must_use]
    pub fn checkouts(&self) -> &CheckoutRegistry {
        &self.inner.checkouts
    }
}
