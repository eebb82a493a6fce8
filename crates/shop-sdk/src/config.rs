//! Storefront configuration.
//!
//! Loaded from TOML or JSON (by file extension). Every section is optional.
//!
//! ```toml
//! [api]
//! base_url = "https://api.example.com"
//! timeout_secs = 10
//!
//! [payment]
//! checkout_url = "https://pay.example.com/checkout"
//! client_key = "test_ck_..."
//! success_url = "https://shop.example.com/payment/success"
//! fail_url = "https://shop.example.com/payment/fail"
//!
//! [checkout]
//! order_route = "orders"
//!
//! [bank_transfer]
//! bank_name = "Shinhan Bank"
//!
//! [storage]
//! dir = "~/.shop"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use shop_commerce::checkout::{BankTransferInstructions, CheckoutConfig, OrderRoute};
use shop_commerce::Currency;

use crate::ConfigError;

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "SHOP_API_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub checkout: CheckoutSection,

    #[serde(default)]
    pub bank_transfer: BankTransferConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Payment gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentConfig {
    /// Hosted checkout page the customer is sent to for card payments.
    #[serde(default = "default_checkout_url")]
    pub checkout_url: String,

    /// Public client key passed to the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,

    #[serde(default)]
    pub currency: Currency,

    #[serde(default = "default_success_url")]
    pub success_url: String,

    #[serde(default = "default_fail_url")]
    pub fail_url: String,
}

fn default_checkout_url() -> String {
    "https://pay.example.com/checkout".to_string()
}

fn default_success_url() -> String {
    CheckoutConfig::default().success_url
}

fn default_fail_url() -> String {
    CheckoutConfig::default().fail_url
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            checkout_url: default_checkout_url(),
            client_key: None,
            currency: Currency::default(),
            success_url: default_success_url(),
            fail_url: default_fail_url(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSection {
    #[serde(default)]
    pub order_route: OrderRoute,
}

/// Account details shown for bank-transfer orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BankTransferConfig {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub deadline_hours: u32,
}

impl Default for BankTransferConfig {
    fn default() -> Self {
        let defaults = BankTransferInstructions::default();
        Self {
            bank_name: defaults.bank_name,
            account_number: defaults.account_number,
            account_holder: defaults.account_holder,
            deadline_hours: defaults.deadline_hours,
        }
    }
}

impl From<BankTransferConfig> for BankTransferInstructions {
    fn from(c: BankTransferConfig) -> Self {
        Self {
            bank_name: c.bank_name,
            account_number: c.account_number,
            account_holder: c.account_holder,
            deadline_hours: c.deadline_hours,
        }
    }
}

/// Where persisted state lives. Without a directory state is kept in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl StorefrontConfig {
    /// Load config from a file. `.json` files are JSON, anything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = if is_json(path) {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };
        let config: Self = parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a file, in the format its extension names.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Write(e.to_string()))?
        } else {
            self.to_toml()?
        };
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Write(e.to_string()))
    }

    /// Apply environment overrides (`SHOP_API_URL`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        self
    }

    /// Check that every URL parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("api.base_url", &self.api.base_url)?;
        check_url("payment.checkout_url", &self.payment.checkout_url)?;
        check_url("payment.success_url", &self.payment.success_url)?;
        check_url("payment.fail_url", &self.payment.fail_url)?;
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "api.timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Settings for the checkout orchestrator.
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            success_url: self.payment.success_url.clone(),
            fail_url: self.payment.fail_url.clone(),
            order_route: self.checkout.order_route,
            bank_transfer: self.bank_transfer.clone().into(),
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map(|_| ()).map_err(|e| ConfigError::Invalid {
        field,
        message: format!("{value}: {e}"),
    })
}

/// Starter `shop.toml`.
pub fn default_config_toml() -> String {
    r#"# Shopfront client configuration

[api]
base_url = "http://localhost:8080"
timeout_secs = 10

[payment]
checkout_url = "https://pay.example.com/checkout"
# client_key = "test_ck_..."
currency = "KRW"
success_url = "http://localhost:3000/payment/success"
fail_url = "http://localhost:3000/payment/fail"

[checkout]
# "orders" or "payment-prepare"
order_route = "orders"

[bank_transfer]
bank_name = "Shinhan Bank"
account_number = "110-000-000000"
account_holder = "Shopfront Inc."
deadline_hours = 24

[storage]
# dir = ".shop"
"#
    .to_string()
}
