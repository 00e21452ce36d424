//! Product listing (home page) route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::catalog::CatalogProduct;
use crate::filters;
use crate::state::AppState;

/// Product card display data for the listing template.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i32,
    pub title: String,
    pub price: Decimal,
    pub image: String,
    /// Quantity of this product currently held in the cart (badge).
    pub cart_amount: u32,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductCardView>,
    pub cart_count: u32,
    /// Set when the catalog could not be reached; renders the empty state.
    pub load_failed: bool,
}

/// Display the product listing.
///
/// Fetches the catalog (served from the client's cache after the first
/// load) and joins it with the cart's current per-product quantities.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let cart = state.cart().cart().await;

    let (products, load_failed) = match state.catalog().get_products().await {
        Ok(products) => (products, false),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load product catalog");
            (Vec::new(), true)
        }
    };

    let products = products
        .into_iter()
        .map(|product: CatalogProduct| ProductCardView {
            id: product.id.as_i32(),
            title: product.title,
            price: product.price,
            image: product.image,
            cart_amount: cart.amount_of(product.id),
        })
        .collect();

    HomeTemplate {
        products,
        cart_count: cart.total_quantity(),
        load_failed,
    }
}
