//! Session-related types.
//!
//! The session is the visitor's per-browser key-value store: it holds the
//! cart and, once signed in, the backend credential.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Credential;

/// Session-stored identity of a signed-in visitor.
#[derive(Clone, Serialize, Deserialize)]
pub struct SignedInUser {
    /// Username the visitor signed in with.
    pub username: String,
    /// Bearer token from the auth service.
    token: String,
}

impl SignedInUser {
    /// Create a signed-in identity from a login response.
    #[must_use]
    pub fn new(username: impl Into<String>, credential: &Credential) -> Self {
        use secrecy::ExposeSecret;

        Self {
            username: username.into(),
            token: credential.token().expose_secret().to_string(),
        }
    }

    /// The credential to present to the backend.
    #[must_use]
    pub fn credential(&self) -> Credential {
        Credential::new(self.token.clone())
    }
}

impl fmt::Debug for SignedInUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedInUser")
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for the serialized cart.
    pub const CART: &str = "cart";

    /// Key for the signed-in visitor.
    pub const CURRENT_USER: &str = "current_user";
}
