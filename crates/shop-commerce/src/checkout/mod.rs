//! Checkout module.
//!
//! Contains the shipping address, the order types exchanged with the backend,
//! and the [`CheckoutOrchestrator`] state machine.

mod address;
mod config;
mod customer;
mod flow;
mod order;

pub use address::ShippingAddress;
pub use config::{BankTransferInstructions, CheckoutConfig, OrderRoute};
pub use customer::Customer;
pub use flow::{CheckoutOrchestrator, CheckoutOutcome, CheckoutState};
pub use order::{
    DraftOrder, DraftOrderItem, Order, OrderAck, OrderItem, OrderStatus, PaymentMethod,
};
