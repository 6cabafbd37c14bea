//! Bearer credential issued by the backend auth service.

use std::fmt;

use secrecy::SecretString;

/// Opaque token proving the current visitor is authenticated.
///
/// Implements `Debug` manually so the token never reaches logs.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a raw bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The token, for building an `Authorization` header.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Source of the current visitor's credential, if any.
///
/// Checkout only uses it as a gate: no credential, no order call.
pub trait CredentialProvider {
    /// The credential of the current visitor, or `None` when signed out.
    fn current_credential(&self) -> Option<&Credential>;
}

impl CredentialProvider for Option<Credential> {
    fn current_credential(&self) -> Option<&Credential> {
        self.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("super_secret_jwt");
        let debug = format!("{credential:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super_secret_jwt"));
        assert_eq!(credential.token().expose_secret(), "super_secret_jwt");
    }

    #[test]
    fn test_option_provider() {
        assert!(None::<Credential>.current_credential().is_none());
        assert!(Some(Credential::new("t")).current_credential().is_some());
    }
}
