//! Product catalog client.
//!
//! Listing pages and single products are cached for 5 minutes. Search
//! results are not cached.

use std::time::Duration;

use moka::future::Cache;
use shopfront_core::{Page, Product, ProductId};
use tracing::{debug, instrument};

use super::{ApiClient, ApiError};

/// Cache key for products and listing pages.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    Products { page: u32, size: u32 },
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Page<Product>),
}

/// Client for the backend product service.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a catalog client over a shared API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { api, cache }
    }

    /// Fetch one page of products (zero-based).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, page: u32, size: u32) -> Result<Page<Product>, ApiError> {
        let key = CacheKey::Products { page, size };
        if let Some(CacheValue::Products(cached)) = self.cache.get(&key).await {
            debug!("Cache hit for product page");
            return Ok(cached);
        }

        let page_param = page.to_string();
        let size_param = size.to_string();
        let result: Page<Product> = self
            .api
            .get(
                "products",
                &[("page", page_param.as_str()), ("size", size_param.as_str())],
                None,
            )
            .await?;

        for product in &result.content {
            self.cache
                .insert(
                    CacheKey::Product(product.id),
                    CacheValue::Product(Box::new(product.clone())),
                )
                .await;
        }
        self.cache
            .insert(key, CacheValue::Products(result.clone()))
            .await;

        Ok(result)
    }

    /// Search products by keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, ApiError> {
        self.api
            .get("products/search", &[("keyword", keyword)], None)
            .await
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails; a missing product is an
    /// `ApiError::Status` for which `is_not_found()` holds.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(cached)) = self.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*cached);
        }

        let product: Product = self.api.get(&format!("products/{id}"), &[], None).await?;
        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }
}
