//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod date;
pub mod id;
pub mod order;
pub mod page;
pub mod price;
pub mod product;

pub use date::format_display_date;
pub use id::*;
pub use order::{OrderConfirmation, OrderLine, OrderRequest, PaymentMethod, PaymentMethodError};
pub use page::Page;
pub use price::{Price, PriceError, format_money, round_for_display};
pub use product::Product;
