use crate::domain::cart::{CartItem, CartItemId};
use crate::domain::catalog::{Category, CategoryId, Product, ProductId};
use crate::domain::invoice::{Invoice, InvoiceId};
use crate::domain::order::{Order, OrderId};
use crate::domain::payment::Payment;
use crate::domain::ports::{
    CartStore, CategoryStore, InvoiceStore, OrderStore, PaymentStore, ProductStore, UserStore,
};
use crate::domain::user::{User, UserId, normalize_email};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Table<K, V> = Arc<RwLock<HashMap<K, V>>>;

/// A thread-safe in-memory store backing every marketplace port.
///
/// Each entity lives in its own `Arc<RwLock<HashMap<..>>>`; clones share the
/// same tables. Used by default and throughout the tests.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    users: Table<UserId, User>,
    categories: Table<CategoryId, Category>,
    products: Table<ProductId, Product>,
    cart_items: Table<CartItemId, CartItem>,
    orders: Table<OrderId, Order>,
    invoices: Table<InvoiceId, Invoice>,
    payments: Table<String, Payment>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert(&self, user: User) -> Result<bool> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Ok(false);
        }
        users.insert(user.id, user);
        Ok(true)
    }

    async fn store(&self, user: User) -> Result<()> {
        self.users.write().await.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl CategoryStore for InMemoryStore {
    async fn store(&self, category: Category) -> Result<()> {
        self.categories.write().await.insert(category.id, category);
        Ok(())
    }

    async fn get(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Category>> {
        Ok(self.categories.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn store(&self, product: Product) -> Result<()> {
        self.products.write().await.insert(product.id, product);
        Ok(())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Product>> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<bool> {
        let mut products = self.products.write().await;
        match products.get_mut(&id) {
            Some(product) if product.has_stock(quantity) => {
                product.stock -= quantity;
                product.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restock(&self, id: ProductId, quantity: u32) -> Result<()> {
        let mut products = self.products.write().await;
        if let Some(product) = products.get_mut(&id) {
            product.stock = product.stock.saturating_add(quantity);
            product.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn store(&self, item: CartItem) -> Result<()> {
        self.cart_items.write().await.insert(item.id, item);
        Ok(())
    }

    async fn get(&self, id: CartItemId) -> Result<Option<CartItem>> {
        Ok(self.cart_items.read().await.get(&id).cloned())
    }

    async fn find(&self, user: UserId, product: ProductId) -> Result<Option<CartItem>> {
        let items = self.cart_items.read().await;
        Ok(items
            .values()
            .find(|i| i.user_id == user && i.product_id == product)
            .cloned())
    }

    async fn for_user(&self, user: UserId) -> Result<Vec<CartItem>> {
        let items = self.cart_items.read().await;
        Ok(items.values().filter(|i| i.user_id == user).cloned().collect())
    }

    async fn delete(&self, id: CartItemId) -> Result<bool> {
        Ok(self.cart_items.write().await.remove(&id).is_some())
    }

    async fn clear(&self, user: UserId, products: Option<&[ProductId]>) -> Result<()> {
        let mut items = self.cart_items.write().await;
        items.retain(|_, i| {
            i.user_id != user || products.is_some_and(|p| !p.contains(&i.product_id))
        });
        Ok(())
    }

    async fn purge_product(&self, product: ProductId) -> Result<()> {
        self.cart_items
            .write()
            .await
            .retain(|_, i| i.product_id != product);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn store(&self, order: Order) -> Result<()> {
        self.orders.write().await.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        Ok(self.orders.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn store(&self, invoice: Invoice) -> Result<()> {
        self.invoices.write().await.insert(invoice.id, invoice);
        Ok(())
    }

    async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>> {
        Ok(self.invoices.read().await.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Invoice>> {
        Ok(self.invoices.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        self.payments
            .write()
            .await
            .insert(payment.reference.clone(), payment);
        Ok(())
    }

    async fn get(&self, reference: &str) -> Result<Option<Payment>> {
        Ok(self.payments.read().await.get(reference).cloned())
    }
}
