//! The payment gateway widget seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the widget receives when a card payment starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    pub amount: i64,
    pub order_id: String,
    pub order_name: String,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub success_url: String,
    pub fail_url: String,
}

impl GatewayRequest {
    /// The request as query parameters, in the gateway's field names.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("amount", self.amount.to_string()),
            ("orderId", self.order_id.clone()),
            ("orderName", self.order_name.clone()),
            ("customerName", self.customer_name.clone()),
        ];
        if let Some(email) = &self.customer_email {
            pairs.push(("customerEmail", email.clone()));
        }
        pairs.push(("successUrl", self.success_url.clone()));
        pairs.push(("failUrl", self.fail_url.clone()));
        pairs
    }
}

/// The widget refused to start, e.g. the customer closed it (`USER_CANCEL`).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct WidgetError {
    pub code: Option<String>,
    pub message: String,
}

impl WidgetError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Third-party payment UI.
///
/// `request_payment` returns once the customer has been handed to the
/// gateway. The outcome arrives later as a redirect, never through this call.
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    async fn request_payment(&self, request: &GatewayRequest) -> Result<(), WidgetError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_order_and_optional_email() {
        let request = GatewayRequest {
            amount: 15000,
            order_id: "77".into(),
            order_name: "Keyboard".into(),
            customer_name: "Kim".into(),
            customer_email: None,
            success_url: "http://localhost:3000/payment/success".into(),
            fail_url: "http://localhost:3000/payment/fail".into(),
        };
        let keys: Vec<&str> = request.query_pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["amount", "orderId", "orderName", "customerName", "successUrl", "failUrl"]
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["orderId"], "77");
        assert!(json.get("customerEmail").is_none());
    }
}
