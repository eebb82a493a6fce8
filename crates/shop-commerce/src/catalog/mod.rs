//! Product catalog module.
//!
//! Products are owned by the backend; the client only reads them and feeds
//! them into the cart.

mod product;

pub use product::{Product, ProductStatus};
