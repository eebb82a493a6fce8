//! The session's cart, persisted on every mutation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shop_cache::Cache;

use crate::cart::{Cart, CartLineItem, CartSummary};
use crate::catalog::Product;
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// Storage key for the persisted cart.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// Owns the current session's cart.
///
/// Every mutation updates the in-memory cart and writes it to the cache while
/// still holding the lock, so the stored cart always matches the last
/// completed operation and a `clear` can never be overwritten by an older
/// write. Storage failures are logged and do not fail the operation.
///
/// Clones share the same cart.
#[derive(Clone, Debug)]
pub struct CartStore {
    cart: Arc<Mutex<Cart>>,
    cache: Cache,
}

impl CartStore {
    /// Load the persisted cart, or start empty.
    ///
    /// A corrupt or unreadable entry is logged and replaced by an empty cart.
    pub fn open(cache: Cache) -> Self {
        let cart = match cache.get::<Cart>(CART_STORAGE_KEY) {
            Ok(Some(mut cart)) => {
                cart.normalize();
                cart
            }
            Ok(None) => Cart::default(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable cart");
                Cart::default()
            }
        };
        tracing::debug!(items = cart.items.len(), "cart loaded");
        Self {
            cart: Arc::new(Mutex::new(cart)),
            cache,
        }
    }

    /// Open with a currency for newly priced items. Ignored if a stored cart exists.
    pub fn open_with_currency(cache: Cache, currency: Currency) -> Self {
        let store = Self::open(cache);
        store.mutate(|cart| {
            if cart.is_empty() {
                cart.currency = currency;
            }
        });
        store
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut cart = self.lock();
        let out = f(&mut cart);
        if let Err(e) = self.cache.set(CART_STORAGE_KEY, &*cart) {
            tracing::warn!(error = %e, "failed to persist cart");
        }
        out
    }

    /// Add one unit of `product`, merging with an existing line.
    pub fn add_item(&self, product: &Product) {
        self.mutate(|cart| cart.add_item(product));
        tracing::debug!(product_id = %product.id, "added to cart");
    }

    /// Set a line's quantity; `quantity <= 0` removes it.
    pub fn update_quantity(&self, product_id: &ProductId, quantity: i64) {
        self.mutate(|cart| cart.update_quantity(product_id, quantity));
    }

    /// Remove a line if present.
    pub fn remove_item(&self, product_id: &ProductId) {
        self.mutate(|cart| cart.remove_item(product_id));
    }

    /// Empty the cart.
    pub fn clear(&self) {
        self.mutate(Cart::clear);
        tracing::debug!("cart cleared");
    }

    pub fn total_amount(&self) -> Money {
        self.lock().total_amount()
    }

    pub fn total_count(&self) -> u64 {
        self.lock().total_count()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current line items.
    pub fn items(&self) -> Vec<CartLineItem> {
        self.lock().items.clone()
    }

    /// Copy of the whole cart.
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary::of(&self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_cache::{KeyValueStore, MemoryStore};

    fn store() -> (CartStore, Cache) {
        let cache = Cache::new(MemoryStore::new());
        (CartStore::open(cache.clone()), cache)
    }

    fn persisted(cache: &Cache) -> Cart {
        cache.get::<Cart>(CART_STORAGE_KEY).unwrap().unwrap()
    }

    #[test]
    fn test_add_writes_through() {
        let (store, cache) = store();
        store.add_item(&Product::new("1", "Mug", 1000));
        store.add_item(&Product::new("1", "Mug", 1000));

        let saved = persisted(&cache);
        assert_eq!(saved.items.len(), 1);
        assert_eq!(saved.items[0].quantity, 2);
        assert_eq!(store.total_amount().amount, 2000);
    }

    #[test]
    fn test_reload_reconstructs_cart() {
        let (store, cache) = store();
        store.add_item(&Product::new("1", "Mug", 1000));
        store.add_item(&Product::new("2", "Pen", 300));

        let reopened = CartStore::open(cache);
        assert_eq!(reopened.items(), store.items());
        assert_eq!(reopened.total_count(), 2);
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let (store, cache) = store();
        store.add_item(&Product::new("1", "Mug", 1000));
        store.clear();

        assert_eq!(store.total_count(), 0);
        assert!(persisted(&cache).items.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let (store, _) = store();
        let other = store.clone();
        other.add_item(&Product::new("1", "Mug", 1000));
        assert_eq!(store.total_count(), 1);
    }

    #[test]
    fn test_corrupt_entry_starts_empty() {
        let raw = Arc::new(MemoryStore::new());
        raw.set(CART_STORAGE_KEY, b"{not json").unwrap();
        let store = CartStore::open(Cache::from_shared(raw));
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_with_currency() {
        let (_, cache) = store();
        let store = CartStore::open_with_currency(cache, Currency::USD);
        store.add_item(&Product::new("1", "Mug", 1299));
        assert_eq!(store.total_amount(), Money::new(1299, Currency::USD));
    }

    #[test]
    fn test_quantity_floor_property() {
        let (store, cache) = store();
        let id = ProductId::new("7");
        for q in [0_i64, -1, -100, i64::MIN] {
            store.add_item(&Product::new("7", "Cup", 100));
            store.update_quantity(&id, q);
            assert!(store.items().iter().all(|i| i.product_id != id));
            assert!(persisted(&cache).line(&id).is_none());
        }
    }
}
