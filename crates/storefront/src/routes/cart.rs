//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Each mutation posts to the cart service and renders either the updated
//! fragment (with an `HX-Trigger: cart-updated` header so the count badge
//! refreshes) or a transient notice fragment on failure. There are no
//! success notices.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use sole_supply_core::{Cart, CartLine, ProductId};
use tracing::instrument;

use crate::filters;
use crate::services::CartOutcome;
use crate::state::AppState;

/// Notice shown when the requested quantity exceeds available stock.
const NOTICE_OUT_OF_STOCK: &str = "Requested quantity is out of stock";
/// Notice shown when adding a product fails for any other reason.
const NOTICE_ADD_FAILED: &str = "Could not add the product to the cart";
/// Notice shown when removing a product fails.
const NOTICE_REMOVE_FAILED: &str = "Could not remove the product from the cart";
/// Notice shown when updating a quantity fails for any other reason.
const NOTICE_UPDATE_FAILED: &str = "Could not update the product quantity";

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i32,
    pub title: String,
    pub image: String,
    pub amount: u32,
    pub price: Decimal,
    pub line_total: Decimal,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: Decimal,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal(),
            item_count: cart.total_quantity(),
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.as_i32(),
            title: line.title.clone(),
            image: line.image.clone(),
            amount: line.amount,
            price: line.price,
            line_total: line.line_total(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub amount: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Transient notice fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/notice.html")]
pub struct NoticeTemplate {
    pub message: String,
}

// =============================================================================
// Outcome -> notice mapping
// =============================================================================

/// The cart operation a request performed, for notice selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CartOp {
    Add,
    Remove,
    Update,
}

/// Map an operation outcome to the notice to display, if any.
///
/// Successful and silently-ignored outcomes produce no notice. Stock
/// violations share one notice across add and update; every other failure
/// gets the generic notice for its operation.
const fn notice_for(op: CartOp, outcome: CartOutcome) -> Option<&'static str> {
    match (op, outcome) {
        (_, CartOutcome::Updated | CartOutcome::Ignored) => None,
        (CartOp::Add | CartOp::Update, CartOutcome::InsufficientStock) => {
            Some(NOTICE_OUT_OF_STOCK)
        }
        (CartOp::Add, _) => Some(NOTICE_ADD_FAILED),
        (CartOp::Remove, _) => Some(NOTICE_REMOVE_FAILED),
        (CartOp::Update, _) => Some(NOTICE_UPDATE_FAILED),
    }
}

/// Render a notice fragment, retargeted at the page's notice region.
fn notice_response(message: &str) -> Response {
    (
        AppendHeaders([("HX-Retarget", "#notices"), ("HX-Reswap", "innerHTML")]),
        NoticeTemplate {
            message: message.to_string(),
        },
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    let cart = state.cart().cart().await;
    CartShowTemplate {
        cart: CartView::from(&cart),
    }
}

/// Add one unit of a product to the cart (HTMX).
///
/// Returns the cart count badge with an HTMX trigger so dependent
/// fragments refresh, or a notice fragment on failure.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Response {
    let id = ProductId::new(form.product_id);
    let outcome = state.cart().add_product(id).await;

    match notice_for(CartOp::Add, outcome) {
        None => {
            let count = state.cart().cart().await.total_quantity();
            (
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartCountTemplate { count },
            )
                .into_response()
        }
        Some(message) => notice_response(message),
    }
}

/// Update a cart line's quantity (HTMX).
#[instrument(skip(state))]
pub async fn update(State(state): State<AppState>, Form(form): Form<UpdateCartForm>) -> Response {
    let id = ProductId::new(form.product_id);
    let outcome = state.cart().update_amount(id, form.amount).await;

    match notice_for(CartOp::Update, outcome) {
        None => cart_items_response(&state, outcome).await,
        Some(message) => notice_response(message),
    }
}

/// Remove a product from the cart (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let id = ProductId::new(form.product_id);
    let outcome = state.cart().remove_product(id).await;

    match notice_for(CartOp::Remove, outcome) {
        None => cart_items_response(&state, outcome).await,
        Some(message) => notice_response(message),
    }
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    let count = state.cart().cart().await.total_quantity();
    CartCountTemplate { count }
}

/// Render the cart items fragment after a non-failing operation.
///
/// Only actual mutations fire the `cart-updated` trigger; an ignored
/// request re-renders the unchanged cart without one.
async fn cart_items_response(state: &AppState, outcome: CartOutcome) -> Response {
    let cart = state.cart().cart().await;
    let template = CartItemsTemplate {
        cart: CartView::from(&cart),
    };

    if outcome == CartOutcome::Updated {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            template,
        )
            .into_response()
    } else {
        template.into_response()
    }
}
