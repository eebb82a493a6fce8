//! Product types.

use crate::ids::ProductId;
use crate::money::{deserialize_price, Currency, Money};
use serde::{Deserialize, Serialize};

/// Product status in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// On sale.
    #[default]
    Available,
    /// Listed but not purchasable right now.
    OutOfStock,
    /// No longer sold.
    Discontinued,
    /// A status this client does not know.
    #[serde(other)]
    Unknown,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "AVAILABLE",
            ProductStatus::OutOfStock => "OUT_OF_STOCK",
            ProductStatus::Discontinued => "DISCONTINUED",
            ProductStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProductStatus::Available => "Available",
            ProductStatus::OutOfStock => "Out of stock",
            ProductStatus::Discontinued => "Discontinued",
            ProductStatus::Unknown => "Unknown",
        }
    }
}

/// A catalog product as the backend returns it.
///
/// `price` is in the smallest unit of the storefront currency and is never
/// negative when read from the backend. Stock is informational; the backend
/// checks it when an order is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

impl Product {
    /// Create a product with just the fields the cart needs.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category: None,
            image_url: None,
            stock: None,
            description: None,
            status: None,
        }
    }

    /// Unit price in `currency`. A negative price counts as free.
    pub fn unit_price(&self, currency: Currency) -> Money {
        Money::new(self.price.max(0), currency)
    }

    /// Whether the product can be added to a cart.
    ///
    /// Unknown statuses are treated as purchasable.
    pub fn is_purchasable(&self) -> bool {
        !matches!(
            self.status,
            Some(ProductStatus::OutOfStock | ProductStatus::Discontinued)
        )
    }
}
