//! Cart and line item types.

use crate::catalog::Product;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// One product entry in the cart.
///
/// `quantity` is never zero: operations that would drop it below one remove
/// the line instead. `unit_price` is never negative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl CartLineItem {
    fn from_product(product: &Product, currency: Currency) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price(currency),
            quantity: 1,
            category: product.category.clone(),
            image_ref: product.image_url.clone(),
        }
    }

    /// `unit_price * quantity`, clamped at the representable range.
    pub fn subtotal(&self) -> Money {
        self.unit_price.saturating_multiply(self.quantity)
    }
}

/// A shopping cart.
///
/// Items keep insertion order. Only the items and the currency are stored;
/// totals are always folded from the items on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    #[serde(default)]
    pub currency: Currency,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
        }
    }

    /// Add one unit of `product`.
    ///
    /// An existing line for the same product is incremented; otherwise a new
    /// line with quantity 1 is appended.
    pub fn add_item(&mut self, product: &Product) {
        match self.line_mut(&product.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => self
                .items
                .push(CartLineItem::from_product(product, self.currency)),
        }
    }

    /// Replace a line's quantity. `quantity <= 0` removes the line.
    ///
    /// Returns `false` when the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line. Removing an absent product is a no-op.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        self.items.len() < len_before
    }

    /// Clear all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `Σ(unit_price × quantity)`.
    pub fn total_amount(&self) -> Money {
        let amount = self
            .items
            .iter()
            .fold(0_i64, |acc, line| acc.saturating_add(line.subtotal().amount));
        Money::new(amount, self.currency)
    }

    /// `Σ(quantity)`.
    pub fn total_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a line by product id.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|i| &i.product_id == product_id)
    }

    /// Restore the line invariants on data read back from storage.
    ///
    /// Zero-quantity lines are dropped, negative prices are raised to zero and
    /// duplicate product lines are merged into the first occurrence.
    pub fn normalize(&mut self) {
        let mut merged: Vec<CartLineItem> = Vec::with_capacity(self.items.len());
        for mut item in self.items.drain(..) {
            if item.quantity == 0 {
                continue;
            }
            if item.unit_price.is_negative() {
                item.unit_price = Money::zero(item.unit_price.currency);
            }
            match merged.iter_mut().find(|m| m.product_id == item.product_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity)
                }
                None => merged.push(item),
            }
        }
        self.items = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product::new(id, format!("Product {id}"), price)
    }

    #[test]
    fn test_add_same_product_merges() {
        let mut cart = Cart::default();
        let p = product("1", 1000);
        cart.add_item(&p);
        cart.add_item(&p);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.total_amount().amount, 2000);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut cart = Cart::default();
        cart.add_item(&product("b", 1));
        cart.add_item(&product("a", 1));
        cart.add_item(&product("b", 1));

        let ids: Vec<&str> = cart.items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_update_quantity_to_zero_removes() {
        let mut cart = Cart::default();
        cart.add_item(&product("1", 500));
        assert!(cart.update_quantity(&ProductId::new("1"), 0));
        assert!(cart.is_empty());
        assert_eq!(cart.total_count(), 0);
    }

    #[test]
    fn test_update_quantity_negative_removes() {
        let mut cart = Cart::default();
        cart.add_item(&product("1", 500));
        cart.update_quantity(&ProductId::new("1"), -3);
        assert!(cart.line(&ProductId::new("1")).is_none());
    }

    #[test]
    fn test_update_quantity_replaces() {
        let mut cart = Cart::default();
        cart.add_item(&product("1", 500));
        cart.update_quantity(&ProductId::new("1"), 4);
        assert_eq!(cart.total_count(), 4);
        assert_eq!(cart.total_amount().amount, 2000);
    }

    #[test]
    fn test_update_missing_product_is_noop() {
        let mut cart = Cart::default();
        assert!(!cart.update_quantity(&ProductId::new("x"), 3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::default();
        cart.add_item(&product("1", 500));
        assert!(!cart.remove_item(&ProductId::new("2")));
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_totals_fold_over_items() {
        let mut cart = Cart::default();
        cart.add_item(&product("1", 1000));
        cart.add_item(&product("2", 250));
        cart.update_quantity(&ProductId::new("2"), 3);

        assert_eq!(cart.total_amount().amount, 1750);
        assert_eq!(cart.total_count(), 4);
    }

    #[test]
    fn test_total_saturates_instead_of_overflowing() {
        let mut cart = Cart::default();
        cart.add_item(&product("1", i64::MAX));
        cart.update_quantity(&ProductId::new("1"), 2);
        assert_eq!(cart.total_amount().amount, i64::MAX);
    }

    #[test]
    fn test_persisted_form_has_no_totals() {
        let mut cart = Cart::default();
        cart.add_item(&product("1", 1000));
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.get("totalAmount").is_none());
        assert!(json.get("total_amount").is_none());
        assert_eq!(json["items"][0]["productId"], 1);
    }

    #[test]
    fn test_normalize_repairs_stored_data() {
        let json = r#"{"items": [
            {"productId": 1, "name": "A", "unitPrice": {"amount": 100, "currency": "KRW"}, "quantity": 1},
            {"productId": 2, "name": "B", "unitPrice": {"amount": 100, "currency": "KRW"}, "quantity": 0},
            {"productId": "1", "name": "A", "unitPrice": {"amount": 100, "currency": "KRW"}, "quantity": 2}
        ]}"#;
        let mut cart: Cart = serde_json::from_str(json).unwrap();
        cart.normalize();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
    }

    #[test]
    fn test_negative_prices_never_make_a_negative_total() {
        let mut cart = Cart::default();
        cart.add_item(&product("1", -500));
        cart.add_item(&product("2", 1000));
        assert_eq!(cart.line(&ProductId::new("1")).unwrap().unit_price.amount, 0);
        assert_eq!(cart.total_amount().amount, 1000);

        let json = r#"{"items": [
            {"productId": 3, "name": "C", "unitPrice": {"amount": -700, "currency": "KRW"}, "quantity": 2}
        ]}"#;
        let mut stored: Cart = serde_json::from_str(json).unwrap();
        stored.normalize();
        assert_eq!(stored.total_amount().amount, 0);
    }
}
