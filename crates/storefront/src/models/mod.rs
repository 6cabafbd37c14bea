//! Domain models for storefront.

pub mod credential;
pub mod session;

pub use credential::{Credential, CredentialProvider};
pub use session::{SignedInUser, keys as session_keys};
