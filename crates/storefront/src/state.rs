//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::services::CartService;
use crate::snapshot::SnapshotStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the catalog client, and the cart service. The cart
/// service is the only holder of mutable state; handlers receive it
/// through this handle rather than through any ambient lookup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    cart: CartService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Builds the catalog client and seeds the cart service from the
    /// durable snapshot at `config.snapshot_path`.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let catalog = CatalogClient::new(&config.catalog);
        let snapshot = SnapshotStore::new(config.snapshot_path.clone());
        let cart = CartService::new(catalog.clone(), snapshot);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }
}
