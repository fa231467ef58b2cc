use super::catalog::{ProductId, ProductView};
use super::money::Money;
use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CartItemId = Uuid;

/// One product staged by a buyer. Unique per (user, product).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(user_id: UserId, product_id: ProductId, quantity: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adding a product already in the cart increases its quantity.
    pub fn merge(&mut self, quantity: u32) {
        self.quantity = self.quantity.saturating_add(quantity);
        self.updated_at = Utc::now();
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: ProductView,
    pub line_total: Money,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    pub total_items: u64,
    pub total_price: Money,
}

impl CartSummary {
    pub fn new(items: Vec<CartLine>) -> Self {
        let total_items = items.iter().map(|line| u64::from(line.item.quantity)).sum();
        let total_price = items.iter().map(|line| line.line_total).sum();
        Self {
            items,
            total_items,
            total_price,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateCartItem {
    pub quantity: u32,
}
