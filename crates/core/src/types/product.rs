//! Catalog product as served by the backend product service.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product from the catalog.
///
/// This is what "add to cart" snapshots: the cart copies the name, price and
/// stock at that moment and never re-reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    /// Units on hand. Informational only; never re-validated at checkout.
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}
