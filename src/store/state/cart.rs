use serde::{Deserialize, Serialize};

/// One product line in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: u64,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product_id: &str, name: &str, unit_price_cents: u64, quantity: u32) -> Self {
        Self {
            product_id: product_id.to_string(),
            name: name.to_string(),
            unit_price_cents,
            quantity,
        }
    }

    /// Price times quantity, clamped at `u64::MAX`
    pub fn subtotal_cents(&self) -> u64 {
        self.unit_price_cents.saturating_mul(u64::from(self.quantity))
    }
}

/// Cart slice
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<CartItem>,
}

impl CartState {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, item| count.saturating_add(item.quantity))
    }

    pub fn total_cents(&self) -> u64 {
        self.items
            .iter()
            .fold(0, |total, item| total.saturating_add(item.subtotal_cents()))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copy of this cart with `item` added, merging quantities of the same product
    pub fn with_item(&self, item: CartItem) -> Self {
        let mut items = self.items.clone();
        match items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => items.push(item),
        }
        Self { items }
    }

    /// Copy of this cart without the given product
    pub fn without_product(&self, product_id: &str) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|i| i.product_id != product_id)
                .cloned()
                .collect(),
        }
    }
}
