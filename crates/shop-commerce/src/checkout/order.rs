//! Order types.

use crate::cart::Cart;
use crate::checkout::{Customer, ShippingAddress};
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::{deserialize_amount, deserialize_optional_amount};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Card payment through the hosted gateway widget.
    Card,
    /// Out-of-band bank transfer.
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::BankTransfer => "Bank transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "CARD" => Ok(PaymentMethod::Card),
            "BANK_TRANSFER" | "BANK" | "TRANSFER" => Ok(PaymentMethod::BankTransfer),
            _ => Err(format!("unknown payment method: {s}")),
        }
    }
}

/// Order status as reported by the backend.
///
/// The backend has used several spellings over time; aliases fold into one
/// variant and anything unrecognised is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    PendingPayment,
    Paid,
    Confirmed,
    Preparing,
    Processing,
    Shipping,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::PendingPayment => "PENDING_PAYMENT",
            OrderStatus::Paid => "PAID",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipping => "SHIPPING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Other(s) => s,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            OrderStatus::Pending => "Order received",
            OrderStatus::PendingPayment => "Awaiting payment",
            OrderStatus::Paid => "Paid",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipping | OrderStatus::Shipped => "In delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
            OrderStatus::Failed => "Failed",
            OrderStatus::Other(s) => s,
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered
                | OrderStatus::Completed
                | OrderStatus::Cancelled
                | OrderStatus::Refunded
                | OrderStatus::Failed
        )
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "WAITING" => OrderStatus::Pending,
            "PENDING_PAYMENT" => OrderStatus::PendingPayment,
            "PAID" | "PAYMENT_COMPLETED" => OrderStatus::Paid,
            "CONFIRMED" => OrderStatus::Confirmed,
            "PREPARING" => OrderStatus::Preparing,
            "PROCESSING" | "IN_PROGRESS" => OrderStatus::Processing,
            "SHIPPING" | "IN_DELIVERY" => OrderStatus::Shipping,
            "SHIPPED" => OrderStatus::Shipped,
            "DELIVERED" => OrderStatus::Delivered,
            "COMPLETED" | "DONE" => OrderStatus::Completed,
            "CANCELLED" | "CANCELED" => OrderStatus::Cancelled,
            "REFUNDED" => OrderStatus::Refunded,
            "FAILED" => OrderStatus::Failed,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One line of a draft order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: i64,
}

/// Snapshot of the cart submitted to create an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrder {
    pub user_id: UserId,
    pub order_items: Vec<DraftOrderItem>,
    pub total_amount: i64,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

impl DraftOrder {
    /// Snapshot `cart` for `customer`.
    pub fn from_cart(
        cart: &Cart,
        customer: &Customer,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            user_id: customer.user_id.clone(),
            order_items: cart
                .items
                .iter()
                .map(|item| DraftOrderItem {
                    product_id: item.product_id.clone(),
                    product_name: item.name.clone(),
                    quantity: item.quantity,
                    price: item.unit_price.amount,
                })
                .collect(),
            total_amount: cart.total_amount().amount,
            shipping_address,
            payment_method,
        }
    }

    /// Short order title shown by the payment gateway.
    ///
    /// `"Keyboard"` for one line, `"Keyboard and 2 more"` for three.
    pub fn order_name(&self) -> String {
        match self.order_items.split_first() {
            None => "Order".to_string(),
            Some((first, [])) => first.product_name.clone(),
            Some((first, rest)) => format!("{} and {} more", first.product_name, rest.len()),
        }
    }
}

/// The backend's answer to an order creation request.
///
/// Depending on the endpoint the id arrives as `id` or `orderId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    #[serde(default)]
    pub id: Option<OrderId>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub total_amount: Option<i64>,
}

impl OrderAck {
    /// The server-assigned order id, if any.
    pub fn assigned_id(&self) -> Option<&OrderId> {
        self.id
            .as_ref()
            .or(self.order_id.as_ref())
            .filter(|id| !id.as_str().trim().is_empty())
    }
}

/// One line of a persisted order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_image_url: Option<String>,
    #[serde(deserialize_with = "deserialize_amount")]
    pub price: i64,
    pub quantity: u32,
}

impl OrderItem {
    pub fn subtotal(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }
}

/// A persisted order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub total_amount: Option<i64>,
    #[serde(default, alias = "orderItems")]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Order {
    /// The order total, falling back to the sum of its lines.
    pub fn total(&self) -> i64 {
        self.total_amount.unwrap_or_else(|| {
            self.items
                .iter()
                .fold(0_i64, |acc, item| acc.saturating_add(item.subtotal()))
        })
    }

    /// Total number of units ordered.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Creation date, when the backend sent a parseable timestamp.
    pub fn created_date(&self) -> Option<chrono::NaiveDate> {
        let raw = self.created_at.as_deref()?.trim();
        if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
            return Some(ts.date_naive());
        }
        if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(ts.date());
        }
        chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}
