//! Home and health handlers.

use axum::response::Redirect;

/// The product listing is the landing page.
pub async fn home() -> Redirect {
    Redirect::to("/products")
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
pub async fn health() -> &'static str {
    "ok"
}
