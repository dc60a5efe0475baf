//! # Order Types
//!
//! Orders, their payment status and the services attached to an order base.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    MXN,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
            Currency::CAD => "cad",
            Currency::AUD => "aud",
            Currency::CHF => "chf",
            Currency::MXN => "mxn",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, most others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::EUR
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for EUR)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a price from smallest unit (cents)
    pub fn from_cents(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Format for display (e.g., "€10.00")
    pub fn display(&self) -> String {
        let symbol = match self.currency {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF ",
            Currency::MXN => "MX$",
        };
        match self.currency.decimal_places() {
            0 => format!("{}{}", symbol, self.amount),
            _ => format!("{}{}.{:02}", symbol, self.amount / 100, (self.amount % 100).abs()),
        }
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::from_cents(0, Currency::default())
    }
}

/// Payment status of an order.
///
/// Variants are declared in ascending order; comparisons follow that order, so
/// "not refused" is `status > PaymentStatus::Refused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Checkout was started but never completed
    Unfinished,
    Deleted,
    Canceled,
    /// The provider refused the payment
    Refused,
    Refund,
    /// Payment is expected but not yet confirmed (prepay, async methods)
    Pending,
    /// Funds are reserved
    Authorized,
    /// Funds were received
    Received,
}

impl PaymentStatus {
    /// True if the customer's basket can be considered done with
    pub fn is_settled(&self) -> bool {
        *self > PaymentStatus::Refused
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unfinished => "unfinished",
            PaymentStatus::Deleted => "deleted",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Refused => "refused",
            PaymentStatus::Refund => "refund",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Received => "received",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unfinished
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Unfinished,
    Deleted,
    Pending,
    Progress,
    Dispatched,
    Delivered,
    Lost,
    Refused,
    Returned,
}

impl Default for DeliveryStatus {
    fn default() -> Self {
        DeliveryStatus::Unfinished
    }
}

/// Type of a service attached to an order base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Payment,
    Delivery,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Payment => "payment",
            ServiceType::Delivery => "delivery",
        }
    }
}

/// A service (payment or delivery) chosen for an order base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderService {
    /// Order base the service belongs to
    pub base_id: String,

    /// Payment or delivery
    #[serde(rename = "type")]
    pub service_type: ServiceType,

    /// Code of the service item
    pub code: String,

    /// Display name at the time of ordering
    #[serde(default)]
    pub name: String,

    /// Values the customer entered for the service
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl OrderService {
    pub fn payment(base_id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            service_type: ServiceType::Payment,
            code: code.into(),
            name: String::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn delivery(base_id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            service_type: ServiceType::Delivery,
            ..Self::payment(base_id, code)
        }
    }
}

/// A placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID
    pub id: String,

    /// The basket-derived aggregate the order was created from
    pub base_id: String,

    #[serde(default)]
    pub payment_status: PaymentStatus,

    #[serde(default)]
    pub delivery_status: DeliveryStatus,

    /// Order total
    #[serde(default)]
    pub price: Price,

    /// Customer email (optional, for provider prefill)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order with generated ID
    pub fn new(base_id: impl Into<String>, price: Price) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            base_id: base_id.into(),
            payment_status: PaymentStatus::Unfinished,
            delivery_status: DeliveryStatus::Unfinished,
            price,
            customer_email: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set the order ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder: set the payment status
    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    /// Set customer email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    /// Change the payment status and touch the modification time
    pub fn set_payment_status(&mut self, status: PaymentStatus) {
        self.payment_status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_ordering() {
        assert!(PaymentStatus::Pending > PaymentStatus::Refused);
        assert!(PaymentStatus::Received > PaymentStatus::Authorized);
        assert!(PaymentStatus::Canceled < PaymentStatus::Refused);

        assert!(PaymentStatus::Authorized.is_settled());
        assert!(PaymentStatus::Refund.is_settled());
        assert!(!PaymentStatus::Refused.is_settled());
        assert!(!PaymentStatus::Unfinished.is_settled());
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_cents(4500, Currency::EUR).display(), "€45.00");
        assert_eq!(Price::from_cents(1999, Currency::USD).display(), "$19.99");
        assert_eq!(Price::from_cents(500, Currency::JPY).display(), "¥500");
    }

    #[test]
    fn test_order_builder() {
        let order = Order::new("B-1", Price::from_cents(1000, Currency::EUR))
            .with_id("O-1")
            .with_payment_status(PaymentStatus::Refused);

        assert_eq!(order.id, "O-1");
        assert_eq!(order.base_id, "B-1");
        assert_eq!(order.payment_status, PaymentStatus::Refused);
    }

    #[test]
    fn test_order_from_toml_defaults() {
        let order: Order = toml::from_str(
            r#"
            id = "O-9"
            base_id = "B-9"
            payment_status = "authorized"
            "#,
        )
        .unwrap();

        assert_eq!(order.payment_status, PaymentStatus::Authorized);
        assert_eq!(order.delivery_status, DeliveryStatus::Unfinished);
        assert_eq!(order.price.amount, 0);
    }
}
