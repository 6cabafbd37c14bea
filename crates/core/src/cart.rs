//! The shopping cart and its reducer operations.
//!
//! A [`Cart`] is a plain value. Every operation consumes the current cart and
//! returns the next one; persisting it is the caller's business. Operations
//! that name a product the cart does not hold are no-ops, never errors.
//!
//! # Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use shopfront_core::{Cart, Price, Product, ProductId};
//!
//! let beans = Product {
//!     id: ProductId::new(1),
//!     name: "Beans".to_string(),
//!     description: None,
//!     price: Price::new(Decimal::new(500, 2)).unwrap(),
//!     stock: 10,
//!     category: None,
//!     image_url: None,
//! };
//!
//! let cart = Cart::new().add_item(&beans).add_item(&beans);
//! assert_eq!(cart.total(), Decimal::new(1000, 2));
//!
//! let cart = cart.update_quantity(ProductId::new(1), -5);
//! assert_eq!(cart.items()[0].quantity(), 1);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, ProductId, round_for_display};

/// Invariant violations found when rebuilding a cart from stored data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The same product appears on more than one line.
    #[error("product {0} appears on more than one cart line")]
    DuplicateProduct(ProductId),
    /// A line has a quantity of zero.
    #[error("cart line for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
}

/// One product entry in the cart, with a price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub name: String,
    /// Price at the time the product was first added. Never re-fetched.
    pub unit_price: Price,
    quantity: u32,
    /// Stock reported by the catalog when the line was created.
    pub stock: u32,
}

impl CartLineItem {
    fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
            stock: product.stock,
        }
    }

    /// Units of this product in the cart; always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `unit_price × quantity`, rounded to cents.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        round_for_display(self.raw_subtotal())
    }

    fn raw_subtotal(&self) -> Decimal {
        self.unit_price.amount() * Decimal::from(self.quantity)
    }
}

/// An ordered collection of line items, unique by product.
///
/// Insertion order is kept for display. Deserialization re-checks the
/// invariants, so a stored cart that violates them fails to load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.product_id == product_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Add one unit of `product`.
    ///
    /// An existing line for the same product has its quantity incremented and
    /// keeps its original price snapshot; otherwise a new line with quantity 1
    /// is appended.
    #[must_use]
    pub fn add_item(mut self, product: &Product) -> Self {
        match self.items.iter_mut().find(|line| line.product_id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.items.push(CartLineItem::from_product(product)),
        }
        self
    }

    /// Change a line's quantity by `delta`, never going below 1.
    ///
    /// Use [`Cart::remove_item`] to drop a line.
    #[must_use]
    pub fn update_quantity(mut self, product_id: ProductId, delta: i64) -> Self {
        if let Some(line) = self.items.iter_mut().find(|line| line.product_id == product_id) {
            let next = i64::from(line.quantity).saturating_add(delta);
            line.quantity = u32::try_from(next.max(1)).unwrap_or(u32::MAX);
        }
        self
    }

    /// Drop the line for `product_id`.
    #[must_use]
    pub fn remove_item(mut self, product_id: ProductId) -> Self {
        self.items.retain(|line| line.product_id != product_id);
        self
    }

    /// Sum of `unit_price × quantity`, rounded to cents.
    #[must_use]
    pub fn total(&self) -> Decimal {
        round_for_display(self.items.iter().map(CartLineItem::raw_subtotal).sum())
    }

    /// Total units across all lines (the header badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }
}

impl TryFrom<Vec<CartLineItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<CartLineItem>) -> Result<Self, Self::Error> {
        for (index, line) in items.iter().enumerate() {
            if line.quantity == 0 {
                return Err(CartError::ZeroQuantity(line.product_id));
            }
            if items
                .iter()
                .skip(index + 1)
                .any(|other| other.product_id == line.product_id)
            {
                return Err(CartError::DuplicateProduct(line.product_id));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
