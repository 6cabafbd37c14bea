//! Per-browser cart persistence.
//!
//! The cart value and its operations live in `shopfront_core::cart`; this
//! module only decides where the serialized cart is kept.

mod store;

pub use store::{CartStore, CartStoreError, MemoryCartStore, SessionCartStore};
