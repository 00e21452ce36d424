//! Cart service: the single writer of cart state.
//!
//! All mutations go through the three operations here. Each one checks the
//! remote source of truth where required, applies the change to the
//! in-memory [`Cart`], and mirrors the result to the durable snapshot. The
//! HTTP layer reads the returned [`CartOutcome`] and renders a notice for
//! the failure cases; no error values escape this boundary.
//!
//! Mutations are serialized: the cart mutex is held across the stock fetch,
//! so a rapid double-click cannot interleave two operations and lose an
//! update.

use sole_supply_core::{Cart, CartLine, ProductId};
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use crate::catalog::{CatalogClient, ProductSource};
use crate::snapshot::SnapshotStore;

/// Result of a cart operation.
///
/// Every failure mode is a value, not an `Err`: remote-fetch failures,
/// stock violations, and missing line items all leave the cart in its
/// prior state and tell the caller which notice (if any) to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// The cart was mutated and the snapshot overwritten.
    Updated,
    /// The request was silently ignored (update with amount < 1). No notice.
    Ignored,
    /// The requested quantity exceeds the available stock.
    InsufficientStock,
    /// No line item exists for the product id.
    NotInCart,
    /// The catalog or stock lookup failed.
    LookupFailed,
}

/// Holds the cart, mediates all mutations, and mirrors state to the
/// durable snapshot after every successful mutation.
///
/// Generic over the product source so cart behavior is testable without a
/// network; the application instantiates it with [`CatalogClient`].
pub struct CartService<S = CatalogClient> {
    source: S,
    snapshot: SnapshotStore,
    cart: Mutex<Cart>,
}

impl<S: ProductSource> CartService<S> {
    /// Create a cart service, seeding the cart from the durable snapshot.
    ///
    /// A missing or unreadable snapshot seeds an empty cart; an I/O failure
    /// while reading is logged and treated the same way.
    pub fn new(source: S, snapshot: SnapshotStore) -> Self {
        let cart = match snapshot.load() {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(
                    path = %snapshot.path().display(),
                    error = %e,
                    "failed to read cart snapshot; starting with an empty cart"
                );
                Cart::new()
            }
        };

        Self {
            source,
            snapshot,
            cart: Mutex::new(cart),
        }
    }

    /// A point-in-time copy of the current cart.
    pub async fn cart(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    /// Whether the snapshot location is usable (readiness probe).
    #[must_use]
    pub fn snapshot_ready(&self) -> bool {
        self.snapshot.ensure_dir().is_ok()
    }

    /// Add one unit of a product to the cart.
    ///
    /// For a product already in the cart, the current stock must be strictly
    /// greater than the amount already held; otherwise the cart is left
    /// unchanged. For a new product, the catalog entry is fetched and a line
    /// with amount 1 appended.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_product(&self, id: ProductId) -> CartOutcome {
        let mut cart = self.cart.lock().await;

        match cart.line(id).map(|line| line.amount) {
            Some(current) => {
                let stock = match self.source.stock(id).await {
                    Ok(stock) => stock,
                    Err(e) => {
                        warn!(error = %e, "stock lookup failed while adding product");
                        return CartOutcome::LookupFailed;
                    }
                };
                // Strictly greater: holding all remaining stock blocks the add.
                if stock.amount <= current {
                    return CartOutcome::InsufficientStock;
                }
                cart.increment(id);
            }
            None => {
                let product = match self.source.product(id).await {
                    Ok(product) => product,
                    Err(e) => {
                        warn!(error = %e, "catalog lookup failed while adding product");
                        return CartOutcome::LookupFailed;
                    }
                };
                cart.push_line(CartLine {
                    id: product.id,
                    title: product.title,
                    price: product.price,
                    image: product.image,
                    amount: 1,
                });
            }
        }

        self.persist(&cart);
        CartOutcome::Updated
    }

    /// Remove a product's line item from the cart.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_product(&self, id: ProductId) -> CartOutcome {
        let mut cart = self.cart.lock().await;

        if !cart.remove(id) {
            return CartOutcome::NotInCart;
        }

        self.persist(&cart);
        CartOutcome::Updated
    }

    /// Set a line item's amount to an explicit value.
    ///
    /// Amounts below 1 are ignored. The stock check runs before the
    /// line-existence check: stock must cover the full requested amount
    /// (greater-or-equal, unlike `add_product`'s strict comparison).
    #[instrument(skip(self), fields(product_id = %id, amount))]
    pub async fn update_amount(&self, id: ProductId, amount: u32) -> CartOutcome {
        if amount < 1 {
            return CartOutcome::Ignored;
        }

        let mut cart = self.cart.lock().await;

        let stock = match self.source.stock(id).await {
            Ok(stock) => stock,
            Err(e) => {
                warn!(error = %e, "stock lookup failed while updating amount");
                return CartOutcome::LookupFailed;
            }
        };
        if stock.amount < amount {
            return CartOutcome::InsufficientStock;
        }

        if !cart.set_amount(id, amount) {
            return CartOutcome::NotInCart;
        }

        self.persist(&cart);
        CartOutcome::Updated
    }

    /// Mirror the cart to the durable snapshot.
    ///
    /// A write failure does not undo the in-memory mutation; it is reported
    /// and the next successful mutation overwrites the stale snapshot.
    fn persist(&self, cart: &Cart) {
        if let Err(e) = self.snapshot.save(cart) {
            tracing::error!(
                path = %self.snapshot.path().display(),
                error = %e,
                "failed to write cart snapshot"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use crate::catalog::{CatalogError, CatalogProduct, Stock};

    /// In-memory product source. `fail` makes every lookup error, modeling
    /// an unreachable catalog service.
    struct StubCatalog {
        products: HashMap<ProductId, CatalogProduct>,
        stock: HashMap<ProductId, u32>,
        fail: bool,
    }

    impl StubCatalog {
        fn new() -> Self {
            let mut products = HashMap::new();
            let mut stock = HashMap::new();
            for (id, price, available) in [(1, 17990, 5), (2, 9990, 2), (3, 4990, 0)] {
                let id = ProductId::new(id);
                products.insert(
                    id,
                    CatalogProduct {
                        id,
                        title: format!("Sneaker {id}"),
                        price: Decimal::new(price, 2),
                        image: format!("https://cdn.example.com/{id}.jpg"),
                    },
                );
                stock.insert(id, available);
            }
            Self {
                products,
                stock,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }
    }

    impl ProductSource for StubCatalog {
        fn product(
            &self,
            id: ProductId,
        ) -> impl Future<Output = Result<CatalogProduct, CatalogError>> + Send {
            let result = if self.fail {
                Err(CatalogError::Api {
                    status: 500,
                    message: "stub failure".to_string(),
                })
            } else {
                self.products
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| CatalogError::NotFound(format!("/products/{id}")))
            };
            async move { result }
        }

        fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send {
            let result = if self.fail {
                Err(CatalogError::Api {
                    status: 500,
                    message: "stub failure".to_string(),
                })
            } else {
                self.stock
                    .get(&id)
                    .map(|&amount| Stock { id, amount })
                    .ok_or_else(|| CatalogError::NotFound(format!("/stock/{id}")))
            };
            async move { result }
        }
    }

    fn service(source: StubCatalog) -> (CartService<StubCatalog>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("cart.json"));
        (CartService::new(source, store), dir)
    }

    #[tokio::test]
    async fn test_add_new_product_appends_single_line() {
        let (service, _dir) = service(StubCatalog::new());

        assert_eq!(
            service.add_product(ProductId::new(1)).await,
            CartOutcome::Updated
        );

        let cart = service.cart().await;
        assert_eq!(cart.len(), 1);
        let line = cart.line(ProductId::new(1)).unwrap();
        assert_eq!(line.amount, 1);
        assert_eq!(line.title, "Sneaker 1");
        assert_eq!(line.price, Decimal::new(17990, 2));
    }

    #[tokio::test]
    async fn test_add_existing_increments_while_stock_allows() {
        let (service, _dir) = service(StubCatalog::new());
        let id = ProductId::new(2); // stock: 2

        assert_eq!(service.add_product(id).await, CartOutcome::Updated);
        assert_eq!(service.add_product(id).await, CartOutcome::Updated);
        assert_eq!(service.cart().await.amount_of(id), 2);

        // Stock equals the held amount: 2 is not strictly greater than 2.
        assert_eq!(service.add_product(id).await, CartOutcome::InsufficientStock);
        assert_eq!(service.cart().await.amount_of(id), 2);
    }

    #[tokio::test]
    async fn test_add_unknown_product_reports_lookup_failure() {
        let (service, _dir) = service(StubCatalog::new());

        assert_eq!(
            service.add_product(ProductId::new(99)).await,
            CartOutcome::LookupFailed
        );
        assert!(service.cart().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_with_unreachable_catalog_leaves_cart_unchanged() {
        let (service, _dir) = service(StubCatalog::failing());

        assert_eq!(
            service.add_product(ProductId::new(1)).await,
            CartOutcome::LookupFailed
        );
        assert!(service.cart().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_present_and_absent() {
        let (service, _dir) = service(StubCatalog::new());
        service.add_product(ProductId::new(1)).await;
        service.add_product(ProductId::new(2)).await;

        assert_eq!(
            service.remove_product(ProductId::new(1)).await,
            CartOutcome::Updated
        );
        let cart = service.cart().await;
        assert_eq!(cart.len(), 1);
        assert!(cart.contains(ProductId::new(2)));

        assert_eq!(
            service.remove_product(ProductId::new(3)).await,
            CartOutcome::NotInCart
        );
        assert_eq!(service.cart().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_amount_zero_is_silently_ignored() {
        let (service, _dir) = service(StubCatalog::new());
        service.add_product(ProductId::new(1)).await;

        assert_eq!(
            service.update_amount(ProductId::new(1), 0).await,
            CartOutcome::Ignored
        );
        // Also ignored for ids that are not in the cart at all.
        assert_eq!(
            service.update_amount(ProductId::new(99), 0).await,
            CartOutcome::Ignored
        );
        assert_eq!(service.cart().await.amount_of(ProductId::new(1)), 1);
    }

    #[tokio::test]
    async fn test_update_amount_respects_stock_inclusive_bound() {
        let (service, _dir) = service(StubCatalog::new());
        let id = ProductId::new(1); // stock: 5
        service.add_product(id).await;

        // Equal to stock is allowed (>=), unlike add's strict comparison.
        assert_eq!(service.update_amount(id, 5).await, CartOutcome::Updated);
        assert_eq!(service.cart().await.amount_of(id), 5);

        assert_eq!(
            service.update_amount(id, 6).await,
            CartOutcome::InsufficientStock
        );
        assert_eq!(service.cart().await.amount_of(id), 5);
    }

    #[tokio::test]
    async fn test_update_checks_stock_before_line_existence() {
        let (service, _dir) = service(StubCatalog::new());

        // Product 3 exists with zero stock and is not in the cart: the
        // stock violation wins over the missing line.
        assert_eq!(
            service.update_amount(ProductId::new(3), 1).await,
            CartOutcome::InsufficientStock
        );

        // Product 1 has stock to spare but no line item.
        assert_eq!(
            service.update_amount(ProductId::new(1), 2).await,
            CartOutcome::NotInCart
        );
    }

    #[tokio::test]
    async fn test_update_with_unreachable_catalog_leaves_cart_unchanged() {
        let (service, dir) = service(StubCatalog::new());
        service.add_product(ProductId::new(1)).await;

        let store = SnapshotStore::new(dir.path().join("cart.json"));
        let service = CartService::new(StubCatalog::failing(), store);

        assert_eq!(
            service.update_amount(ProductId::new(1), 2).await,
            CartOutcome::LookupFailed
        );
        assert_eq!(service.cart().await.amount_of(ProductId::new(1)), 1);
    }

    #[tokio::test]
    async fn test_snapshot_reseeds_identical_cart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");

        let service = CartService::new(StubCatalog::new(), SnapshotStore::new(&path));
        service.add_product(ProductId::new(1)).await;
        service.add_product(ProductId::new(2)).await;
        service.update_amount(ProductId::new(1), 3).await;
        let before = service.cart().await;
        drop(service);

        let reseeded = CartService::new(StubCatalog::new(), SnapshotStore::new(&path));
        assert_eq!(reseeded.cart().await, before);
    }

    #[tokio::test]
    async fn test_failed_operations_do_not_touch_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");

        let service = CartService::new(StubCatalog::new(), SnapshotStore::new(&path));
        service.add_product(ProductId::new(1)).await;
        let persisted = std::fs::read(&path).unwrap();

        service.remove_product(ProductId::new(9)).await;
        service.update_amount(ProductId::new(1), 100).await;
        service.add_product(ProductId::new(99)).await;

        assert_eq!(std::fs::read(&path).unwrap(), persisted);
    }
}
