//! Remote catalog API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`; the catalog service is the source of truth
//!   for products and stock - NO local sync, direct API calls
//! - In-memory caching via `moka` for product responses (5 minute TTL)
//! - Stock lookups are never cached: the stock comparison is the one
//!   correctness-bearing remote read in the cart flow
//!
//! # Endpoints
//!
//! - `GET /products` - full product catalog
//! - `GET /products/{id}` - single product
//! - `GET /stock/{id}` - available units for a product
//!
//! # Example
//!
//! ```rust,ignore
//! use sole_supply_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog);
//!
//! let products = client.get_products().await?;
//! let stock = client.get_stock(ProductId::new(1)).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::CatalogClient;
pub use types::{CatalogProduct, Stock};

use std::future::Future;

use sole_supply_core::ProductId;
use thiserror::Error;

/// Errors that can occur when interacting with the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read access to product and stock data, as the cart service consumes it.
///
/// Implemented by [`CatalogClient`]; test code substitutes an in-memory
/// source so cart state transitions can be exercised without a network.
pub trait ProductSource: Send + Sync {
    /// Fetch a single product by id.
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<CatalogProduct, CatalogError>> + Send;

    /// Fetch the available stock for a product id.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send;
}
