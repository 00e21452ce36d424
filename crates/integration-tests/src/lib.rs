//! Integration tests for Sole Supply.
//!
//! # Running Tests
//!
//! ```bash
//! # Start a catalog API (e.g. a json-server style stub) on port 3333,
//! # then the storefront:
//! CATALOG_BASE_URL=http://localhost:3333 cargo run -p sole-supply-storefront
//!
//! # Run integration tests
//! cargo test -p sole-supply-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - listing page and cart flow against a running server
