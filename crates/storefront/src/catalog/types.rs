//! Domain types for the catalog API.
//!
//! These mirror the catalog service's JSON wire format. A catalog product
//! carries no quantity; quantities only exist on cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sole_supply_core::ProductId;

/// A product as served by `GET /products` and `GET /products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Catalog product id.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Decimal,
    /// Product image URL.
    pub image: String,
}

/// Available stock for a product, as served by `GET /stock/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product id this stock entry belongs to.
    pub id: ProductId,
    /// Units available from the catalog service.
    pub amount: u32,
}
