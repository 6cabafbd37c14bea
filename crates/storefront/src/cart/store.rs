//! Cart store implementations.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use shopfront_core::Cart;
use thiserror::Error;
use tower_sessions::Session;

use crate::models::session_keys;

/// Errors writing the cart.
///
/// Reads never fail: a missing or unreadable cart loads as empty.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The session backend rejected the write.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the serialized cart lives.
///
/// Each call replaces or reads the whole cart; there are no partial writes
/// and the last write wins.
pub trait CartStore: Send + Sync {
    /// Read the cart. Absent or corrupt data yields an empty cart.
    fn load(&self) -> impl Future<Output = Cart> + Send;

    /// Replace the stored cart.
    fn save(&self, cart: &Cart) -> impl Future<Output = Result<(), CartStoreError>> + Send;

    /// Remove the stored cart entirely.
    fn clear(&self) -> impl Future<Output = Result<(), CartStoreError>> + Send;
}

// =============================================================================
// SessionCartStore
// =============================================================================

/// Cart kept in the visitor's session.
#[derive(Clone)]
pub struct SessionCartStore {
    session: Session,
}

impl SessionCartStore {
    /// Wrap the current request's session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStore for SessionCartStore {
    async fn load(&self) -> Cart {
        match self.session.get::<Cart>(session_keys::CART).await {
            Ok(cart) => cart.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable cart");
                Cart::new()
            }
        }
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CartStoreError> {
        // remove_value skips deserialization, so a corrupt cart can still be cleared
        self.session.remove_value(session_keys::CART).await?;
        // Checkout clears from a detached task; the response that would
        // normally persist the session may never be sent
        self.session.save().await?;
        Ok(())
    }
}

// =============================================================================
// MemoryCartStore
// =============================================================================

/// Cart kept in memory as serialized JSON.
///
/// Stores the same serialized form the session does, so corrupt data can be
/// injected with [`MemoryCartStore::with_raw`].
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    raw: Mutex<Option<String>>,
}

impl MemoryCartStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with raw serialized data.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    /// The raw stored value, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CartStore for MemoryCartStore {
    async fn load(&self) -> Cart {
        let Some(raw) = self.raw() else {
            return Cart::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable cart");
            Cart::new()
        })
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        let raw = serde_json::to_string(cart)?;
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CartStoreError> {
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
