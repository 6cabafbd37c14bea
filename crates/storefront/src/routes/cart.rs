//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every change loads the stored
//! cart, applies one reducer operation and saves the result, then answers
//! with an HTMX fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use shopfront_core::{Cart, CartLineItem, PaymentMethod, ProductId, format_money};
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::cart::{CartStore, SessionCartStore};
use crate::config::CheckoutDefaults;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// HTMX event fired whenever the cart changes, refreshing the header badge.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: i64,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub subtotal: String,
}

impl From<&CartLineItem> for CartLineView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            product_id: line.product_id.as_i64(),
            name: line.name.clone(),
            unit_price: line.unit_price.to_string(),
            quantity: line.quantity(),
            subtotal: format_money(line.subtotal()),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            total: format_money(cart.total()),
            item_count: cart.item_count(),
        }
    }
}

/// A payment method choice in the checkout form.
#[derive(Clone)]
pub struct PaymentOption {
    pub code: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Checkout form defaults.
#[derive(Clone)]
pub struct CheckoutFormView {
    pub shipping_address: String,
    pub payment_methods: Vec<PaymentOption>,
}

impl From<&CheckoutDefaults> for CheckoutFormView {
    fn from(defaults: &CheckoutDefaults) -> Self {
        Self {
            shipping_address: defaults.shipping_address.clone(),
            payment_methods: PaymentMethod::ALL
                .iter()
                .map(|method| PaymentOption {
                    code: method.code(),
                    label: method.label(),
                    selected: *method == defaults.payment_method,
                })
                .collect(),
        }
    }
}

/// Outcome message shown above the cart.
#[derive(Clone)]
pub struct Notice {
    pub success: bool,
    pub message: String,
    /// Backend timestamp, rendered with the `display_date` filter.
    pub order_date: Option<String>,
}

impl Notice {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            order_date: None,
        }
    }
}

/// Product form data.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: i64,
}

/// Quantity change form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i64,
    pub delta: i64,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
    pub checkout: CheckoutFormView,
    pub notice: Option<Notice>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub checkout: CheckoutFormView,
    pub notice: Option<Notice>,
}

impl CartItemsTemplate {
    /// Render `cart` with the configured checkout defaults.
    #[must_use]
    pub fn new(state: &AppState, cart: &Cart, notice: Option<Notice>) -> Self {
        Self {
            cart: CartView::from(cart),
            checkout: CheckoutFormView::from(&state.config().checkout),
            notice,
        }
    }
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Save `cart` and answer with the refreshed cart fragment.
async fn save_and_render(
    state: &AppState,
    store: &SessionCartStore,
    cart: Cart,
) -> Result<Response> {
    store.save(&cart).await?;
    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartItemsTemplate::new(state, &cart, None),
    )
        .into_response())
}

/// Display cart page.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
) -> impl IntoResponse {
    let cart = SessionCartStore::new(session.clone()).load().await;

    CartShowTemplate {
        ctx: PageContext {
            viewer: auth.viewer(),
            cart_count: cart.item_count(),
        },
        cart: CartView::from(&cart),
        checkout: CheckoutFormView::from(&state.config().checkout),
        notice: None,
    }
}

/// Add one unit of a product to the cart (HTMX).
///
/// The product is looked up in the catalog so the line snapshots the
/// current name, price and stock. Out-of-stock products are refused.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let id = ProductId::new(form.product_id);
    let product = state.catalog().get_product(id).await.map_err(|e| {
        if e.is_not_found() {
            AppError::NotFound(format!("product {id}"))
        } else {
            AppError::Api(e)
        }
    })?;

    if !product.is_in_stock() {
        return Err(AppError::BadRequest(format!("{} is out of stock", product.name)));
    }

    let store = SessionCartStore::new(session);
    let cart = store.load().await.add_item(&product);
    store.save(&cart).await?;

    let id_param = id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id_param.as_str())]));
    tracing::debug!(product_id = %id, count = cart.item_count(), "Added to cart");

    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response())
}

/// Change a line's quantity by a delta (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let store = SessionCartStore::new(session);
    let cart = store
        .load()
        .await
        .update_quantity(ProductId::new(form.product_id), form.delta);
    save_and_render(&state, &store, cart).await
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let store = SessionCartStore::new(session);
    let cart = store.load().await.remove_item(ProductId::new(form.product_id));
    save_and_render(&state, &store, cart).await
}

/// Empty the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Response> {
    let store = SessionCartStore::new(session);
    store.clear().await?;
    add_breadcrumb("cart", "Cleared cart", None);

    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartItemsTemplate::new(&state, &Cart::new(), None),
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: SessionCartStore::new(session).load().await.item_count(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::{Price, Product};

    use super::*;

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            description: None,
            price: Price::new(Decimal::new(cents, 2)).unwrap(),
            stock: 10,
            category: None,
            image_url: None,
        }
    }

    #[test]
    fn test_cart_view_formats_money() {
        let cart = Cart::new()
            .add_item(&product(1, 999))
            .add_item(&product(1, 999))
            .add_item(&product(2, 5));

        let view = CartView::from(&cart);

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].unit_price, "$9.99");
        assert_eq!(view.items[0].subtotal, "$19.98");
        assert_eq!(view.total, "$20.03");
        assert_eq!(view.item_count, 3);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&Cart::new());
        assert!(view.items.is_empty());
        assert_eq!(view.total, "$0.00");
    }

    #[test]
    fn test_checkout_form_selects_default_method() {
        let defaults = CheckoutDefaults {
            shipping_address: "1 Main St".to_string(),
            payment_method: PaymentMethod::BankTransfer,
        };

        let form = CheckoutFormView::from(&defaults);

        assert_eq!(form.payment_methods.len(), PaymentMethod::ALL.len());
        let selected: Vec<_> = form
            .payment_methods
            .iter()
            .filter(|m| m.selected)
            .map(|m| m.code)
            .collect();
        assert_eq!(selected, vec!["BANK_TRANSFER"]);
    }
}
