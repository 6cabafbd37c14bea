//! Order creation.

use std::future::Future;

use reqwest::StatusCode;
use shopfront_core::{OrderConfirmation, OrderRequest};
use thiserror::Error;
use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::models::Credential;

/// Why an order could not be created.
#[derive(Debug, Error)]
pub enum OrderApiError {
    /// The request never got a usable answer (connection, timeout, bad body).
    #[error("order service unreachable: {0}")]
    Network(#[source] ApiError),

    /// The order service refused the order (invalid payment method,
    /// out-of-stock item, expired credential, ...).
    #[error("order rejected ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the order service.
        status: StatusCode,
        /// Reason given by the order service, if any.
        message: String,
    },
}

impl From<ApiError> for OrderApiError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, body } => Self::Rejected {
                status,
                message: rejection_message(&body),
            },
            other => Self::Network(other),
        }
    }
}

/// The remote order-creation operation.
///
/// Implementations make exactly one attempt per call; callers are
/// responsible for not calling twice for one user action.
pub trait OrderApi: Send + Sync {
    /// Create an order on behalf of the holder of `credential`.
    fn create_order(
        &self,
        request: &OrderRequest,
        credential: &Credential,
    ) -> impl Future<Output = Result<OrderConfirmation, OrderApiError>> + Send;
}

/// [`OrderApi`] backed by the backend order service (`POST orders`).
#[derive(Clone)]
pub struct HttpOrderApi {
    api: ApiClient,
}

impl HttpOrderApi {
    /// Create an order client over a shared API client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl OrderApi for HttpOrderApi {
    #[instrument(skip_all, fields(lines = request.items.len()))]
    async fn create_order(
        &self,
        request: &OrderRequest,
        credential: &Credential,
    ) -> Result<OrderConfirmation, OrderApiError> {
        Ok(self.api.post("orders", request, Some(credential)).await?)
    }
}

/// Pull a human-readable reason out of an error body.
///
/// The backend answers with `{"error": ...}` or `{"message": ...}` objects;
/// anything else is passed through as text.
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "message"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(String::from))
        })
        .unwrap_or_else(|| body.trim().to_string())
}
