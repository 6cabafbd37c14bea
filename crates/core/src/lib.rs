//! Shopfront Core - Shared types library.
//!
//! This crate provides the domain model used by the `storefront` crate:
//! catalog products, the shopping cart and the order request sent to the
//! backend at checkout.
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! sessions, no HTTP clients. Every cart operation takes the previous
//! [`Cart`] and returns the next one, which keeps it trivially testable and
//! lets the storefront decide where the cart is persisted.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and prices, catalog and order types
//! - [`cart`] - The cart value and its reducer operations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartError, CartLineItem};
pub use types::*;
