//! Durable client-side key-value storage for the shopfront client.
//!
//! Plays the role browser local storage plays for a web storefront: a small
//! per-profile store that survives reloads. Values are JSON-serialized.
//!
//! # Example
//!
//! ```rust
//! use shop_cache::{Cache, MemoryStore};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Cart {
//!     items: Vec<String>,
//! }
//!
//! let cache = Cache::new(MemoryStore::new());
//! cache.set("cart-storage", &Cart { items: vec!["1".into()] }).unwrap();
//!
//! let cart: Option<Cart> = cache.get("cart-storage").unwrap();
//! assert_eq!(cart.unwrap().items.len(), 1);
//!
//! cache.delete("cart-storage").unwrap();
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KeyValueStore, MemoryStore};
}
