//! Authentication extractors.
//!
//! The signed-in visitor is read from the session once per request. Handlers
//! pass the resulting [`Viewer`] to templates instead of re-reading it.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{Credential, SignedInUser, session_keys};

/// Extractor that optionally gets the signed-in visitor.
///
/// Never rejects; an unreadable session entry counts as signed out.
pub struct OptionalAuth(pub Option<SignedInUser>);

impl OptionalAuth {
    /// The visitor's backend credential, if signed in.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.0.as_ref().map(SignedInUser::credential)
    }

    /// Template view of the visitor.
    #[must_use]
    pub fn viewer(&self) -> Viewer {
        Viewer {
            username: self.0.as_ref().map(|user| user.username.clone()),
        }
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<SignedInUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// What templates know about the visitor.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub username: Option<String>,
}

impl Viewer {
    #[must_use]
    pub const fn logged_in(&self) -> bool {
        self.username.is_some()
    }
}

/// Helper to set the signed-in visitor in the session.
///
/// Rotates the session ID first so a pre-login session ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &SignedInUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the signed-in visitor from the session (logout).
///
/// The cart stays in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(session_keys::CURRENT_USER).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use tower_sessions::MemoryStore;

    use super::*;

    fn parts_with(session: Option<Session>) -> Parts {
        let (mut parts, ()) = Request::get("/cart").body(()).unwrap().into_parts();
        if let Some(session) = session {
            parts.extensions.insert(session);
        }
        parts
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_optional_auth_signed_out() {
        let mut parts = parts_with(Some(session()));
        let Ok(auth) = OptionalAuth::from_request_parts(&mut parts, &()).await;

        assert!(auth.0.is_none());
        assert!(auth.credential().is_none());
        assert!(!auth.viewer().logged_in());
    }

    #[tokio::test]
    async fn test_optional_auth_signed_in() {
        let session = session();
        let user = SignedInUser::new("alice", &Credential::new("jwt"));
        set_current_user(&session, &user).await.unwrap();

        let mut parts = parts_with(Some(session));
        let Ok(auth) = OptionalAuth::from_request_parts(&mut parts, &()).await;

        assert_eq!(auth.viewer().username.as_deref(), Some("alice"));
        assert!(auth.credential().is_some());
    }

    #[tokio::test]
    async fn test_optional_auth_without_session_layer() {
        let mut parts = parts_with(None);
        let Ok(auth) = OptionalAuth::from_request_parts(&mut parts, &()).await;

        assert!(auth.0.is_none());
    }

    #[tokio::test]
    async fn test_clear_current_user_keeps_cart() {
        let session = session();
        session.insert(session_keys::CART, serde_json::json!([])).await.unwrap();
        set_current_user(&session, &SignedInUser::new("bob", &Credential::new("t")))
            .await
            .unwrap();

        clear_current_user(&session).await.unwrap();

        assert!(session.get_value(session_keys::CURRENT_USER).await.unwrap().is_none());
        assert!(session.get_value(session_keys::CART).await.unwrap().is_some());
    }
}
