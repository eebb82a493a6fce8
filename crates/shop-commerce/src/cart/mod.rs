//! Shopping cart module.
//!
//! [`Cart`] holds the line items and the quantity arithmetic, [`CartSummary`]
//! is a freshly computed view for display, and [`CartStore`] owns the
//! session's cart and writes it through to client storage.

mod cart;
mod pricing;
mod store;

pub use cart::{Cart, CartLineItem};
pub use pricing::{CartSummary, LineSummary};
pub use store::{CartStore, CART_STORAGE_KEY};
