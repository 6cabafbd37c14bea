//! Checkout submission.
//!
//! A [`CheckoutSubmitter`] turns the stored cart into exactly one order call
//! per user action:
//!
//! ```text
//! Idle ──submit──▶ Submitting ──ok──▶ Succeeded (cart cleared)
//!                      │
//!                      └──err──▶ Failed (cart untouched)
//! ```
//!
//! `Succeeded` and `Failed` both accept a new submission. Only `Submitting`
//! rejects one.
//!
//! Once the order call is issued it runs to completion or failure: routes go
//! through [`CheckoutSubmitter::submit_detached`], which runs the submission
//! on its own task so a dropped request cannot cancel it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use shopfront_core::{OrderConfirmation, OrderId, OrderRequest, PaymentMethod};
use thiserror::Error;
use tracing::{Instrument, instrument};

use crate::backend::{ApiError, OrderApi, OrderApiError};
use crate::cart::CartStore;
use crate::config::MAX_API_TIMEOUT;
use crate::models::{Credential, CredentialProvider};

/// Idle submitters are dropped after this long.
///
/// Must stay well above [`MAX_API_TIMEOUT`] so an in-flight submitter is
/// never idle-evicted; a session re-reads its entry on every checkout.
const SUBMITTER_IDLE: Duration = Duration::from_secs(30 * 60);

const _: () = assert!(SUBMITTER_IDLE.as_secs() > 2 * MAX_API_TIMEOUT.as_secs());

/// Upper bound on tracked sessions.
const MAX_SUBMITTERS: u64 = 10_000;

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
    #[default]
    Idle,
    Submitting,
    Succeeded(OrderId),
    /// Last attempt failed; carries a message for the visitor.
    Failed(String),
}

/// Why a checkout did not produce an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Another submission from the same session is still in flight.
    #[error("a checkout is already in progress")]
    AlreadySubmitting,

    /// No credential; the order service was not contacted.
    #[error("please log in to checkout")]
    Unauthenticated,

    /// The order service could not be reached.
    #[error("could not reach the order service")]
    Network(#[source] ApiError),

    /// The order service refused the order.
    #[error("order rejected: {message}")]
    Rejected { status: StatusCode, message: String },

    /// The submission task died before reporting back.
    #[error("checkout did not finish")]
    Interrupted,
}

impl From<OrderApiError> for CheckoutError {
    fn from(err: OrderApiError) -> Self {
        match err {
            OrderApiError::Network(source) => Self::Network(source),
            OrderApiError::Rejected { status, message } => Self::Rejected { status, message },
        }
    }
}

/// Visitor-supplied order details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
}

/// Submits the cart as an order, at most once at a time.
#[derive(Debug, Default)]
pub struct CheckoutSubmitter {
    state: Mutex<CheckoutState>,
}

impl CheckoutSubmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        self.lock().clone()
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        *self.lock() == CheckoutState::Submitting
    }

    /// Submit the stored cart.
    ///
    /// Checks run in this order: an in-flight submission rejects the call
    /// with no side effects, then a missing credential fails it before any
    /// network traffic. Otherwise the order service is called exactly once.
    /// On success the stored cart is cleared; on failure it is left as is.
    ///
    /// An empty cart is submitted as-is; callers reject it first.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`].
    #[instrument(skip_all, fields(payment_method = %details.payment_method))]
    pub async fn submit<A, S, P>(
        &self,
        api: &A,
        store: &S,
        auth: &P,
        details: CheckoutDetails,
    ) -> Result<OrderConfirmation, CheckoutError>
    where
        A: OrderApi,
        S: CartStore,
        P: CredentialProvider + Sync + ?Sized,
    {
        let (guard, credential) = {
            let mut state = self.lock();
            if *state == CheckoutState::Submitting {
                tracing::debug!("Ignoring checkout while one is in flight");
                return Err(CheckoutError::AlreadySubmitting);
            }

            let Some(credential) = auth.current_credential().cloned() else {
                *state = CheckoutState::Failed(CheckoutError::Unauthenticated.to_string());
                tracing::info!("Checkout attempted without signing in");
                return Err(CheckoutError::Unauthenticated);
            };

            *state = CheckoutState::Submitting;
            let guard = SubmittingGuard {
                submitter: self,
                finished: false,
            };
            (guard, credential)
        };

        let cart = store.load().await;
        let request =
            OrderRequest::from_cart(&cart, details.shipping_address, details.payment_method);

        match api.create_order(&request, &credential).await {
            Ok(confirmation) => {
                tracing::info!(order_id = %confirmation.id, items = request.items.len(), "Order placed");
                // The order exists; a failed clear must not make it look failed.
                if let Err(e) = store.clear().await {
                    tracing::error!(error = %e, order_id = %confirmation.id, "Failed to clear cart after order");
                }
                guard.finish(CheckoutState::Succeeded(confirmation.id));
                Ok(confirmation)
            }
            Err(e) => {
                let err = CheckoutError::from(e);
                tracing::warn!(error = %err, "Checkout failed");
                guard.finish(CheckoutState::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Submit on a separate task and wait for it.
    ///
    /// Dropping the returned future leaves the submission running, so an
    /// issued order call always reaches `Succeeded` (clearing the cart) or
    /// `Failed`.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`].
    pub async fn submit_detached<A, S>(
        self: Arc<Self>,
        api: A,
        store: S,
        credential: Option<Credential>,
        details: CheckoutDetails,
    ) -> Result<OrderConfirmation, CheckoutError>
    where
        A: OrderApi + 'static,
        S: CartStore + 'static,
    {
        let task = tokio::spawn(
            async move { self.submit(&api, &store, &credential, details).await }
                .in_current_span(),
        );

        task.await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Checkout task failed");
            Err(CheckoutError::Interrupted)
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CheckoutState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Leaves `Submitting` when the submission future is dropped mid-flight,
/// e.g. on a panic or a runtime shutdown.
struct SubmittingGuard<'a> {
    submitter: &'a CheckoutSubmitter,
    finished: bool,
}

impl SubmittingGuard<'_> {
    fn finish(mut self, next: CheckoutState) {
        *self.submitter.lock() = next;
        self.finished = true;
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::warn!("Checkout interrupted before the order service answered");
        *self.submitter.lock() = CheckoutState::Failed("checkout was interrupted".to_string());
    }
}

/// One [`CheckoutSubmitter`] per browser session.
///
/// A submitter evicted for capacity while its task is in flight is still
/// finished by that task, but a click landing in that window gets a fresh
/// guard.
#[derive(Clone)]
pub struct CheckoutRegistry {
    submitters: Cache<String, Arc<CheckoutSubmitter>>,
}

impl Default for CheckoutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            submitters: Cache::builder()
                .max_capacity(MAX_SUBMITTERS)
                .time_to_idle(SUBMITTER_IDLE)
                .build(),
        }
    }

    /// The submitter for `session_key`, created on first use.
    pub async fn submitter(&self, session_key: &str) -> Arc<CheckoutSubmitter> {
        self.submitters
            .get_with(session_key.to_string(), async { Arc::new(CheckoutSubmitter::new()) })
            .await
    }
}
