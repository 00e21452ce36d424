//! Core types for Sole Supply.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;

pub use cart::{Cart, CartLine};
pub use id::*;
