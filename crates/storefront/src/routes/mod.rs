//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to /products
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (?page=N) or search (?q=term)
//! GET  /products/search        - Product grid fragment (HTMX, debounced)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Change quantity by delta (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! POST /cart/clear             - Empty the cart (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout               - Submit the cart as an order (returns cart_items fragment)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::cart::{CartStore, SessionCartStore};
use crate::middleware::{OptionalAuth, Viewer};
use crate::state::AppState;

/// Debounce applied to the search box before it hits the server.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// What every full page needs for the header.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub viewer: Viewer,
    pub cart_count: u32,
}

impl PageContext {
    /// Build the header context from the request's session and auth.
    pub async fn load(session: &Session, auth: &OptionalAuth) -> Self {
        Self {
            viewer: auth.viewer(),
            cart_count: SessionCartStore::new(session.clone())
                .load()
                .await
                .item_count(),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/search", get(products::search))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(home::health))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::submit))
        .nest("/auth", auth_routes())
}
