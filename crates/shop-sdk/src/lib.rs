//! # Shopfront SDK
//!
//! Client core for a storefront backed by an order/payment REST API and a
//! hosted payment gateway.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_sdk::prelude::*;
//!
//! let config = StorefrontConfig::load("shop.toml")?.with_env_overrides();
//! let shop = Storefront::builder(config).open().await?;
//!
//! let products = shop.products().list().await?;
//! shop.cart().add_item(&products[0]);
//!
//! shop.session().login("kim@example.com", "password1").await?;
//! let address = ShippingAddress::new("Kim", "010-1234-5678", "Seoul");
//! shop.checkout(address, PaymentMethod::Card).await?;
//!
//! // Later, when the gateway redirects back:
//! let outcome = shop.handle_redirect(&redirect_url).await?;
//! ```
//!
//! ## Crates
//!
//! - `shop_cache`: persisted client state
//! - `shop_data`: HTTP gateway and typed API client
//! - `shop_commerce`: cart, checkout and payment reconciliation
//! - `shop_auth`: login session

pub mod config;
mod error;
pub mod prelude;
mod storefront;
pub mod telemetry;
mod widget;

pub use error::{ConfigError, SdkError};
pub use storefront::{RedirectOutcome, Storefront, StorefrontBuilder};
pub use widget::HostedCheckoutWidget;

pub use shop_auth;
pub use shop_cache;
pub use shop_commerce;
pub use shop_data;
