//! Checkout route handler.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use shopfront_core::{Cart, PaymentMethod};
use tower_sessions::Session;
use tracing::instrument;

use super::cart::{CART_UPDATED_EVENT, CartItemsTemplate, Notice};
use crate::cart::{CartStore, SessionCartStore};
use crate::checkout::{CheckoutDetails, CheckoutError};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Checkout form data. Blank fields fall back to the configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
}

impl CheckoutForm {
    fn into_details(self, state: &AppState) -> Result<CheckoutDetails> {
        let defaults = &state.config().checkout;

        let shipping_address = self
            .shipping_address
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .unwrap_or_else(|| defaults.shipping_address.clone());

        let payment_method = match self.payment_method.as_deref().map(str::trim) {
            None | Some("") => defaults.payment_method,
            Some(code) => code
                .parse::<PaymentMethod>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?,
        };

        Ok(CheckoutDetails {
            shipping_address,
            payment_method,
        })
    }
}

/// Submit the cart as an order (HTMX).
///
/// Answers with the cart fragment plus a notice. A repeated click while an
/// order is in flight gets `204 No Content`, which htmx leaves unswapped.
/// The order call runs detached, so a disconnect does not cancel it.
#[instrument(skip(state, session, auth))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let store = SessionCartStore::new(session.clone());
    let cart = store.load().await;
    if cart.is_empty() {
        let notice = Notice::error("Your cart is empty");
        return Ok(CartItemsTemplate::new(&state, &cart, Some(notice)).into_response());
    }

    let details = form.into_details(&state)?;

    // Sessions with a cart have been saved, so they have an ID
    let Some(session_id) = session.id() else {
        return Err(AppError::Internal(
            "session holding a cart has no ID".to_string(),
        ));
    };
    let submitter = state.checkouts().submitter(&session_id.to_string()).await;

    let result = submitter
        .submit_detached(state.orders().clone(), store, auth.credential(), details)
        .await;

    match result {
        Ok(confirmation) => {
            let order_id = confirmation.id.to_string();
            add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

            let notice = Notice {
                success: true,
                message: format!("Order #{} placed successfully!", confirmation.id),
                order_date: confirmation.order_date,
            };
            Ok((
                AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
                CartItemsTemplate::new(&state, &Cart::new(), Some(notice)),
            )
                .into_response())
        }
        Err(CheckoutError::AlreadySubmitting) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => {
            let message = match &e {
                CheckoutError::Unauthenticated => "Please login to place an order".to_string(),
                CheckoutError::Rejected { message, .. } if !message.is_empty() => {
                    format!("Checkout failed: {message}")
                }
                _ => "Checkout failed. Please try again.".to_string(),
            };
            Ok(CartItemsTemplate::new(&state, &cart, Some(Notice::error(message))).into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rust_decimal::Decimal;
    use shopfront_core::{Price, Product, ProductId};
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::{ApiConfig, StorefrontConfig};

    fn state() -> AppState {
        // Nothing listens here; these tests never reach the order service
        let api = ApiConfig::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap();
        AppState::new(StorefrontConfig::with_api("http://localhost:3000", api)).unwrap()
    }

    fn product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Item".to_string(),
            description: None,
            price: Price::new(Decimal::new(500, 2)).unwrap(),
            stock: 3,
            category: None,
            image_url: None,
        }
    }

    #[test]
    fn test_blank_form_uses_defaults() {
        let form = CheckoutForm {
            shipping_address: Some("   ".to_string()),
            payment_method: Some(String::new()),
        };

        let details = form.into_details(&state()).unwrap();

        assert_eq!(details.shipping_address, "Default Address");
        assert_eq!(details.payment_method, PaymentMethod::CreditCard);
    }

    #[tokio::test]
    async fn test_cart_in_unsaved_session_is_an_error() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        SessionCartStore::new(session.clone())
            .save(&Cart::new().add_item(&product()))
            .await
            .unwrap();
        assert!(session.id().is_none());

        let result = submit(
            State(state()),
            session,
            OptionalAuth(None),
            Form(CheckoutForm::default()),
        )
        .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
