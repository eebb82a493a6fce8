//! Shipping address.

use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// Where an order is delivered.
///
/// `recipient_name`, `phone` and `address` are required; `zip_code` and
/// `address_detail` may be left empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub recipient_name: String,
    pub phone: String,
    #[serde(default)]
    pub zip_code: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_detail: Option<String>,
}

impl ShippingAddress {
    /// Create an address from the required fields.
    pub fn new(
        recipient_name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            phone: phone.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Set the postal code.
    pub fn with_zip_code(mut self, zip_code: impl Into<String>) -> Self {
        self.zip_code = zip_code.into();
        self
    }

    /// Set the second address line.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.address_detail = Some(detail.into());
        self
    }

    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("recipient name", &self.recipient_name),
            ("phone", &self.phone),
            ("address", &self.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Check the required fields.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::InvalidAddress(missing))
        }
    }

    /// Single-line form for display.
    pub fn one_line(&self) -> String {
        let mut line = String::new();
        if !self.zip_code.trim().is_empty() {
            line.push_str(&format!("({}) ", self.zip_code.trim()));
        }
        line.push_str(self.address.trim());
        if let Some(detail) = self.address_detail.as_deref().map(str::trim) {
            if !detail.is_empty() {
                line.push(' ');
                line.push_str(detail);
            }
        }
        line
    }
}
