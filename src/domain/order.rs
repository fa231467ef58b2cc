use super::catalog::{Product, ProductId};
use super::money::{Money, Price};
use super::user::{PartySummary, UserId};
use crate::error::MarketError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub type OrderId = Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Rewriting the current status is allowed so notes can change on their own.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        *self == next
            || matches!(
                (self, next),
                (Pending, Confirmed)
                    | (Pending, Cancelled)
                    | (Confirmed, Delivered)
                    | (Confirmed, Cancelled)
            )
    }

    /// Orders in these states count towards revenue.
    pub fn is_revenue(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Delivered)
    }
}

/// A line of an order, snapshotted from the product at purchase time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub sku: String,
    pub supplier_id: UserId,
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Money,
}

impl OrderItem {
    pub fn from_product(product: &Product, quantity: u32) -> Result<Self, MarketError> {
        Ok(Self {
            product_id: product.id,
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            supplier_id: product.supplier_id,
            quantity,
            unit_price: product.price,
            total_price: product.price.line_total(quantity)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub shipping_address: String,
    pub notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        user_id: UserId,
        items: Vec<OrderItem>,
        shipping_address: String,
        notes: Option<String>,
    ) -> Result<Self, MarketError> {
        let now = Utc::now();
        let total_amount = Money::checked_sum(items.iter().map(|item| item.total_price))?;
        Ok(Self {
            id: Uuid::new_v4(),
            order_number: document_number("ORD", now),
            user_id,
            status: OrderStatus::Pending,
            items,
            total_amount,
            shipping_address,
            notes,
            paid_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn involves_supplier(&self, supplier_id: UserId) -> bool {
        self.items.iter().any(|item| item.supplier_id == supplier_id)
    }

    pub fn transition(
        &mut self,
        next: OrderStatus,
        notes: Option<String>,
    ) -> Result<(), MarketError> {
        if !self.status.can_transition_to(next) {
            return Err(MarketError::validation(format!(
                "Cannot move order from {:?} to {:?}",
                self.status, next
            )));
        }
        self.status = next;
        if notes.is_some() {
            self.notes = notes;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_paid(&mut self, at: DateTime<Utc>) -> Result<(), MarketError> {
        self.transition(OrderStatus::Confirmed, None)?;
        self.paid_at = Some(at);
        Ok(())
    }
}

/// Order with its buyer and line suppliers resolved.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub buyer: Option<PartySummary>,
    pub suppliers: Vec<PartySummary>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub items: Vec<OrderLine>,
    pub shipping_address: String,
    pub notes: Option<String>,
}

impl OrderDraft {
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.items.is_empty() {
            return Err(MarketError::validation("At least one item is required"));
        }
        if self.items.iter().any(|line| line.quantity < 1) {
            return Err(MarketError::validation("Quantity must be at least 1"));
        }
        if self.shipping_address.trim().is_empty() {
            return Err(MarketError::validation("Shipping address is required"));
        }
        Ok(())
    }

    /// Folds lines naming the same product into one, keeping first-seen order.
    pub fn merged_lines(&self) -> Vec<OrderLine> {
        let mut quantities: BTreeMap<ProductId, u32> = BTreeMap::new();
        let mut order = Vec::new();
        for line in &self.items {
            let entry = quantities.entry(line.product_id).or_insert_with(|| {
                order.push(line.product_id);
                0
            });
            *entry = entry.saturating_add(line.quantity);
        }
        order
            .into_iter()
            .map(|product_id| OrderLine {
                product_id,
                quantity: quantities[&product_id],
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

/// Admin dashboard shortcuts.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OrderAction {
    Approve,
    Cancel,
}

impl OrderAction {
    pub fn target_status(&self) -> OrderStatus {
        match self {
            OrderAction::Approve => OrderStatus::Confirmed,
            OrderAction::Cancel => OrderStatus::Cancelled,
        }
    }
}

impl std::str::FromStr for OrderAction {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(OrderAction::Approve),
            "cancel" => Ok(OrderAction::Cancel),
            _ => Err(MarketError::validation("Invalid action")),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
}

/// `PREFIX-<millis>-<6 hex>`; the suffix keeps numbers unique within a millisecond.
pub fn document_number(prefix: &str, at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}-{}-{}",
        at.timestamp_millis(),
        suffix[..6].to_uppercase()
    )
}
