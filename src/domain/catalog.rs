use super::money::Price;
use super::user::{PartySummary, UserId};
use crate::error::MarketError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CategoryId = Uuid;
pub type ProductId = Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(draft: CategoryDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            image: draft.image,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.name.trim().is_empty() {
            return Err(MarketError::validation("Category name is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub sku: String,
    pub stock: u32,
    pub min_order: u32,
    pub category_id: CategoryId,
    pub image: Option<String>,
    pub supplier_id: UserId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(draft: ProductDraft, supplier_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            price: draft.price,
            sku: draft.sku.trim().to_string(),
            stock: draft.stock,
            min_order: draft.min_order,
            category_id: draft.category_id,
            image: draft.image,
            supplier_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, draft: ProductDraft) {
        self.name = draft.name.trim().to_string();
        self.description = draft.description;
        self.price = draft.price;
        self.sku = draft.sku.trim().to_string();
        self.stock = draft.stock;
        self.min_order = draft.min_order;
        self.category_id = draft.category_id;
        self.image = draft.image;
        self.updated_at = Utc::now();
    }

    pub fn has_stock(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }

    /// Case-insensitive match on name or description.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// Body of product create and update requests.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub sku: String,
    pub stock: u32,
    #[serde(default = "default_min_order")]
    pub min_order: u32,
    pub category_id: CategoryId,
    pub image: Option<String>,
}

fn default_min_order() -> u32 {
    1
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.name.trim().is_empty() {
            return Err(MarketError::validation("Product name is required"));
        }
        if self.sku.trim().is_empty() {
            return Err(MarketError::validation("SKU is required"));
        }
        if self.min_order < 1 {
            return Err(MarketError::validation(
                "Minimum order must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A product with its category and supplier resolved.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub supplier: Option<PartySummary>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub supplier_id: Option<UserId>,
}
