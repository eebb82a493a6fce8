//! Cart totals for display.

use crate::cart::Cart;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Totals for a cart, computed fresh from its items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Per-line breakdown, in cart order.
    pub lines: Vec<LineSummary>,
    /// `Σ(unit_price × quantity)`.
    pub total_amount: Money,
    /// `Σ(quantity)`.
    pub total_count: u64,
}

/// Pricing for a single line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineSummary {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub subtotal: Money,
}

impl CartSummary {
    /// Summarize a cart.
    pub fn of(cart: &Cart) -> Self {
        Self {
            lines: cart
                .items
                .iter()
                .map(|item| LineSummary {
                    product_id: item.product_id.clone(),
                    name: item.name.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    subtotal: item.subtotal(),
                })
                .collect(),
            total_amount: cart.total_amount(),
            total_count: cart.total_count(),
        }
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    #[test]
    fn test_summary_matches_items() {
        let mut cart = Cart::default();
        cart.add_item(&Product::new("1", "Mug", 1200));
        cart.add_item(&Product::new("2", "Pen", 300));
        cart.update_quantity(&ProductId::new("2"), 5);

        let summary = CartSummary::of(&cart);
        assert_eq!(summary.line_count(), 2);
        assert_eq!(summary.lines[1].subtotal.amount, 1500);
        assert_eq!(summary.total_amount.amount, 2700);
        assert_eq!(summary.total_count, 6);

        let line_sum: i64 = summary.lines.iter().map(|l| l.subtotal.amount).sum();
        assert_eq!(line_sum, summary.total_amount.amount);
    }

    #[test]
    fn test_summary_of_empty_cart() {
        let summary = CartSummary::of(&Cart::default());
        assert!(summary.lines.is_empty());
        assert!(summary.total_amount.is_zero());
        assert_eq!(summary.total_count, 0);
    }
}
