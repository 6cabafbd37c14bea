//! Order request and confirmation types exchanged with the order service.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderId, Price, ProductId};
use crate::cart::Cart;

/// Payment methods accepted by the order service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    BankTransfer,
    EWallet,
    Cod,
}

/// Error returned when parsing an unknown payment method code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct PaymentMethodError(pub String);

impl PaymentMethod {
    /// Every method, in the order they are offered at checkout.
    pub const ALL: [Self; 4] = [
        Self::CreditCard,
        Self::BankTransfer,
        Self::EWallet,
        Self::Cod,
    ];

    /// Wire code (e.g. `CREDIT_CARD`).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CreditCard => "CREDIT_CARD",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::EWallet => "E_WALLET",
            Self::Cod => "COD",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit card",
            Self::BankTransfer => "Bank transfer",
            Self::EWallet => "E-wallet",
            Self::Cod => "Cash on delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|method| method.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| PaymentMethodError(code.to_string()))
    }
}

/// One line of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Price,
}

/// The body of an order-creation call.
///
/// Built fresh from the cart at checkout time and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
}

impl OrderRequest {
    /// Snapshot a cart into an order request.
    #[must_use]
    pub fn from_cart(
        cart: &Cart,
        shipping_address: impl Into<String>,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|line| OrderLine {
                    product_id: line.product_id,
                    product_name: line.name.clone(),
                    quantity: line.quantity(),
                    unit_price: line.unit_price,
                })
                .collect(),
            shipping_address: shipping_address.into(),
            payment_method,
        }
    }
}

/// Acknowledgement returned by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub id: OrderId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub order_date: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Product;

    fn product(id: i64, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: None,
            price: Price::new(price.parse().unwrap()).unwrap(),
            stock: 5,
            category: None,
            image_url: None,
        }
    }

    #[test]
    fn test_payment_method_wire_codes() {
        assert_eq!(
            serde_json::to_value(PaymentMethod::EWallet).unwrap(),
            json!("E_WALLET")
        );
        assert_eq!(
            "bank_transfer".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
        assert!("CHEQUE".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_from_cart_snapshots_lines_in_order() {
        let cart = Cart::new()
            .add_item(&product(2, "3.00"))
            .add_item(&product(1, "9.99"))
            .add_item(&product(2, "3.00"));

        let request = OrderRequest::from_cart(&cart, "12 Main St", PaymentMethod::Cod);

        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[0].product_id, ProductId::new(2));
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.items[1].product_name, "Product 1");
    }

    #[test]
    fn test_order_request_wire_shape() {
        let cart = Cart::new().add_item(&product(1, "9.99"));
        let request = OrderRequest::from_cart(&cart, "Default Address", PaymentMethod::CreditCard);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "items": [{
                    "productId": 1,
                    "productName": "Product 1",
                    "quantity": 1,
                    "unitPrice": "9.99"
                }],
                "shippingAddress": "Default Address",
                "paymentMethod": "CREDIT_CARD"
            })
        );
    }

    #[test]
    fn test_confirmation_tolerates_extra_fields() {
        let confirmation: OrderConfirmation = serde_json::from_str(
            r#"{"id": 77, "userId": 4, "status": "PENDING", "totalAmount": "19.98", "items": []}"#,
        )
        .unwrap();
        assert_eq!(confirmation.id, OrderId::new(77));
        assert_eq!(confirmation.status.as_deref(), Some("PENDING"));
        assert!(confirmation.order_date.is_none());
    }
}
