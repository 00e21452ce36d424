//! Catalog API client implementation.
//!
//! Plain REST over `reqwest`. Product responses are cached using `moka`
//! (5-minute TTL); stock responses go to the network every time.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use sole_supply_core::ProductId;
use tracing::{debug, instrument};

use crate::catalog::cache::CacheValue;
use crate::catalog::types::{CatalogProduct, Stock};
use crate::catalog::{CatalogError, ProductSource};
use crate::config::CatalogConfig;

/// Cache key for the full product list.
const PRODUCTS_CACHE_KEY: &str = "products";

/// Client for the remote catalog API.
///
/// Provides access to products and stock. Product data is cached for
/// 5 minutes; stock is always fetched fresh.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog API client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                path = %path,
                body = %message.chars().take(200).collect::<String>(),
                "catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// Get the full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
        // Check cache
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(PRODUCTS_CACHE_KEY).await
        {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products: Vec<CatalogProduct> = self.get_json("/products").await?;

        self.inner
            .cache
            .insert(
                PRODUCTS_CACHE_KEY.to_string(),
                CacheValue::Products(products.clone()),
            )
            .await;

        Ok(products)
    }

    /// Get a product by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError> {
        let cache_key = format!("product:{id}");

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: CatalogProduct = self.get_json(&format!("/products/{id}")).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the current stock for a product id. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the stock entry is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        self.get_json(&format!("/stock/{id}")).await
    }
}

impl ProductSource for CatalogClient {
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<CatalogProduct, CatalogError>> + Send {
        self.get_product(id)
    }

    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send {
        self.get_stock(id)
    }
}
