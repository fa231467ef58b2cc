use super::cart::{CartItem, CartItemId};
use super::catalog::{Category, CategoryId, Product, ProductId};
use super::invoice::{Invoice, InvoiceId};
use super::order::{Order, OrderId};
use super::payment::{
    InitializePayment, InitializedPayment, Payment, PaymentProvider, VerifiedPayment,
};
use super::user::{User, UserId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new account; `false` when the email is already registered.
    async fn insert(&self, user: User) -> Result<bool>;
    async fn store(&self, user: User) -> Result<()>;
    async fn get(&self, id: UserId) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_all(&self) -> Result<Vec<User>>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn store(&self, category: Category) -> Result<()>;
    async fn get(&self, id: CategoryId) -> Result<Option<Category>>;
    async fn get_all(&self) -> Result<Vec<Category>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn store(&self, product: Product) -> Result<()>;
    async fn get(&self, id: ProductId) -> Result<Option<Product>>;
    async fn get_all(&self) -> Result<Vec<Product>>;
    async fn delete(&self, id: ProductId) -> Result<bool>;
    /// Atomically takes `quantity` units; `false` (and no change) when stock is short.
    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<bool>;
    async fn restock(&self, id: ProductId, quantity: u32) -> Result<()>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn store(&self, item: CartItem) -> Result<()>;
    async fn get(&self, id: CartItemId) -> Result<Option<CartItem>>;
    async fn find(&self, user: UserId, product: ProductId) -> Result<Option<CartItem>>;
    async fn for_user(&self, user: UserId) -> Result<Vec<CartItem>>;
    async fn delete(&self, id: CartItemId) -> Result<bool>;
    /// Removes the user's lines for `products`, or the whole cart when `None`.
    async fn clear(&self, user: UserId, products: Option<&[ProductId]>) -> Result<()>;
    /// Drops a product from every cart.
    async fn purge_product(&self, product: ProductId) -> Result<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;
    async fn get_all(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn store(&self, invoice: Invoice) -> Result<()>;
    async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>>;
    async fn get_all(&self) -> Result<Vec<Invoice>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, reference: &str) -> Result<Option<Payment>>;
}

/// Hosted-checkout payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn provider(&self) -> PaymentProvider;
    async fn initialize(&self, request: InitializePayment) -> Result<InitializedPayment>;
    /// `Err(MarketError::Gateway)` when the provider refuses to verify the reference.
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment>;
}

pub type UserStoreBox = Box<dyn UserStore>;
pub type CategoryStoreBox = Box<dyn CategoryStore>;
pub type ProductStoreBox = Box<dyn ProductStore>;
pub type CartStoreBox = Box<dyn CartStore>;
pub type OrderStoreBox = Box<dyn OrderStore>;
pub type InvoiceStoreBox = Box<dyn InvoiceStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;

/// Every persistence port the marketplace needs, usually backed by one adapter.
pub struct Stores {
    pub users: UserStoreBox,
    pub categories: CategoryStoreBox,
    pub products: ProductStoreBox,
    pub carts: CartStoreBox,
    pub orders: OrderStoreBox,
    pub invoices: InvoiceStoreBox,
    pub payments: PaymentStoreBox,
}

impl Stores {
    /// Wires all ports to clones of a single adapter.
    pub fn from_adapter<S>(adapter: S) -> Self
    where
        S: UserStore
            + CategoryStore
            + ProductStore
            + CartStore
            + OrderStore
            + InvoiceStore
            + PaymentStore
            + Clone
            + 'static,
    {
        Self {
            users: Box::new(adapter.clone()),
            categories: Box::new(adapter.clone()),
            products: Box::new(adapter.clone()),
            carts: Box::new(adapter.clone()),
            orders: Box::new(adapter.clone()),
            invoices: Box::new(adapter.clone()),
            payments: Box::new(adapter),
        }
    }
}
