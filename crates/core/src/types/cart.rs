//! Cart domain model: line items and the ordered cart collection.
//!
//! `Cart` owns the two invariants the rest of the system relies on:
//! no two line items share a product id, and every line item's amount
//! is at least 1. All mutation goes through the methods here; the
//! storefront's cart service layers stock checks and persistence on top.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A product entry inside the cart, carrying a quantity.
///
/// Catalog data (title, price, image) is denormalized into the line at the
/// time the product is added, matching what the remote catalog returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog product id.
    pub id: ProductId,
    /// Product title at the time of adding.
    pub title: String,
    /// Unit price.
    pub price: Decimal,
    /// Product image URL.
    pub image: String,
    /// Quantity held in the cart. Always >= 1.
    pub amount: u32,
}

impl CartLine {
    /// Price of the whole line (`unit price * amount`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.amount)
    }
}

/// An ordered sequence of cart line items, unique by product id.
///
/// Serializes transparently as the line array, which is also the durable
/// snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Rebuild a cart from previously serialized line items.
    ///
    /// Re-establishes the invariants on data that crossed a trust boundary
    /// (the durable snapshot): later duplicates of a product id are dropped,
    /// as are lines with a zero amount.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.amount >= 1 && !cart.contains(line.id) {
                cart.lines.push(line);
            }
        }
        cart
    }

    /// All line items, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The line item for a product id, if present.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// The amount held for a product id (0 if not in the cart).
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.line(id).map_or(0, |line| line.amount)
    }

    /// Whether a line item exists for the product id.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.line(id).is_some()
    }

    /// Sum of all line amounts (the cart badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.amount).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Append a new line item at the end of the cart.
    ///
    /// Returns `false` (cart unchanged) if a line for the product id already
    /// exists or the amount is zero.
    pub fn push_line(&mut self, line: CartLine) -> bool {
        if line.amount < 1 || self.contains(line.id) {
            return false;
        }
        self.lines.push(line);
        true
    }

    /// Set the amount of an existing line item.
    ///
    /// Returns `false` (cart unchanged) if no line exists for the product id
    /// or the amount is zero.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> bool {
        if amount < 1 {
            return false;
        }
        match self.lines.iter_mut().find(|line| line.id == id) {
            Some(line) => {
                line.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Increment an existing line item's amount by 1.
    ///
    /// Returns the new amount, or `None` (cart unchanged) if no line exists
    /// for the product id.
    pub fn increment(&mut self, id: ProductId) -> Option<u32> {
        self.lines.iter_mut().find(|line| line.id == id).map(|line| {
            line.amount += 1;
            line.amount
        })
    }

    /// Remove the line item for a product id.
    ///
    /// Returns `false` (cart unchanged) if no line exists for the id.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.lines.len() != before
    }
}
