//! Storefront commerce core.
//!
//! - **Cart**: the session's line items, quantity rules and fresh totals,
//!   written through to client storage on every change
//! - **Checkout**: address validation, order creation and the hand-off to
//!   the payment gateway or bank transfer
//! - **Payment**: reconciliation of the gateway's success and fail redirects
//! - **API**: typed order, payment and product endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_commerce::prelude::*;
//!
//! let cart = CartStore::open(cache.clone());
//! cart.add_item(&product);
//! println!("Total: {}", cart.total_amount());
//!
//! let outcome = checkout
//!     .submit(&customer, ShippingAddress::new("Kim", "010-1234-5678", "1 Main St"), PaymentMethod::Card)
//!     .await?;
//!
//! // Later, after the gateway redirects back:
//! let confirmed = reconciler
//!     .confirm_payment(SuccessCallback::parse(&redirect_url)?)
//!     .await?;
//! ```

pub mod api;
pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod payment;

pub use cart::{Cart, CartLineItem, CartStore, CartSummary};
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::api::{ConfirmPaymentRequest, OrderApi, Payment, PaymentApi, ProductApi};
    pub use crate::catalog::{Product, ProductStatus};

    // Cart
    pub use crate::cart::{Cart, CartLineItem, CartStore, CartSummary, LineSummary};

    // Checkout
    pub use crate::checkout::{
        BankTransferInstructions, CheckoutConfig, CheckoutOrchestrator, CheckoutOutcome,
        CheckoutState, Customer, DraftOrder, Order, OrderRoute, OrderStatus, PaymentMethod,
        ShippingAddress,
    };

    // Payment
    pub use crate::payment::{
        ConfirmationOutcome, FailCallback, GatewayErrorCode, GatewayRequest, PaymentFailure,
        PaymentSession, PaymentSessionLedger, PaymentWidget, Reconciler, SuccessCallback,
        WidgetError, GENERIC_PAYMENT_ERROR,
    };
}
