//! Checkout settings.

use serde::{Deserialize, Serialize};

/// Which backend endpoint creates the order at checkout.
///
/// Older backends create orders through the payment preparation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderRoute {
    /// `POST /api/orders`
    #[default]
    Orders,
    /// `POST /api/payments/prepare`
    PaymentPrepare,
}

impl OrderRoute {
    pub fn path(&self) -> &'static str {
        match self {
            OrderRoute::Orders => "/api/orders",
            OrderRoute::PaymentPrepare => "/api/payments/prepare",
        }
    }
}

/// Static instructions shown after a bank-transfer order is placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BankTransferInstructions {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    /// Hours the customer has to complete the transfer.
    pub deadline_hours: u32,
}

impl Default for BankTransferInstructions {
    fn default() -> Self {
        Self {
            bank_name: "Shinhan Bank".to_string(),
            account_number: "110-000-000000".to_string(),
            account_holder: "Shopfront Inc.".to_string(),
            deadline_hours: 24,
        }
    }
}

/// Settings the checkout orchestrator needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckoutConfig {
    /// Where the gateway redirects after a successful payment.
    pub success_url: String,
    /// Where the gateway redirects after a failed or cancelled payment.
    pub fail_url: String,
    pub order_route: OrderRoute,
    pub bank_transfer: BankTransferInstructions,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            success_url: "http://localhost:3000/payment/success".to_string(),
            fail_url: "http://localhost:3000/payment/fail".to_string(),
            order_route: OrderRoute::default(),
            bank_transfer: BankTransferInstructions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_route_paths() {
        assert_eq!(OrderRoute::default().path(), "/api/orders");
        assert_eq!(OrderRoute::PaymentPrepare.path(), "/api/payments/prepare");
        let route: OrderRoute = serde_json::from_str("\"payment-prepare\"").unwrap();
        assert_eq!(route, OrderRoute::PaymentPrepare);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CheckoutConfig =
            serde_json::from_str(r#"{"successUrl": "https://shop.example/ok"}"#).unwrap();
        assert_eq!(config.success_url, "https://shop.example/ok");
        assert_eq!(config.fail_url, CheckoutConfig::default().fail_url);
        assert_eq!(config.bank_transfer.deadline_hours, 24);
    }
}
