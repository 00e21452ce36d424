//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Cart state: add/remove/update operations, remote stock checks,
//!   durable snapshot mirroring

pub mod cart;

pub use cart::{CartOutcome, CartService};
