use crate::domain::cart::{CartItem, CartItemId};
use crate::domain::catalog::{Category, CategoryId, Product, ProductId};
use crate::domain::invoice::{Invoice, InvoiceId};
use crate::domain::order::{Order, OrderId};
use crate::domain::payment::Payment;
use crate::domain::ports::{
    CartStore, CategoryStore, InvoiceStore, OrderStore, PaymentStore, ProductStore, UserStore,
};
use crate::domain::user::{User, UserId, normalize_email};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for user accounts.
pub const CF_USERS: &str = "users";
/// Column Family mapping normalized email to user id.
pub const CF_USER_EMAILS: &str = "user_emails";
pub const CF_CATEGORIES: &str = "categories";
pub const CF_PRODUCTS: &str = "products";
pub const CF_CART_ITEMS: &str = "cart_items";
pub const CF_ORDERS: &str = "orders";
pub const CF_INVOICES: &str = "invoices";
/// Column Family for payments, keyed by gateway reference.
pub const CF_PAYMENTS: &str = "payments";

const COLUMN_FAMILIES: [&str; 8] = [
    CF_USERS,
    CF_USER_EMAILS,
    CF_CATEGORIES,
    CF_PRODUCTS,
    CF_CART_ITEMS,
    CF_ORDERS,
    CF_INVOICES,
    CF_PAYMENTS,
];

/// A persistent store implementation using RocksDB.
///
/// Every entity gets its own Column Family and is stored as JSON under its id.
/// Read-modify-write operations (email registration, stock decrements, cart
/// clears) are serialised through `write_lock`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that every marketplace column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| MarketError::Internal(format!("{name} column family not found")))
    }

    fn put<T: Serialize>(&self, cf: &str, key: impl AsRef<[u8]>, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(self.cf(cf)?, key, bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf: &str, key: impl AsRef<[u8]>) -> Result<Option<T>> {
        match self.db.get_pinned_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn remove(&self, cf: &str, key: impl AsRef<[u8]>) -> Result<bool> {
        let handle = self.cf(cf)?;
        let existed = self.db.get_pinned_cf(handle, key.as_ref())?.is_some();
        if existed {
            self.db.delete_cf(handle, key)?;
        }
        Ok(existed)
    }

    fn scan<T: DeserializeOwned>(&self, cf: &str) -> Result<Vec<T>> {
        let mut values = Vec::new();
        for item in self.db.iterator_cf(self.cf(cf)?, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn insert(&self, user: User) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        if self
            .db
            .get_pinned_cf(self.cf(CF_USER_EMAILS)?, user.email.as_bytes())?
            .is_some()
        {
            return Ok(false);
        }
        self.db
            .put_cf(self.cf(CF_USER_EMAILS)?, user.email.as_bytes(), user.id.as_bytes())?;
        self.put(CF_USERS, user.id.as_bytes(), &user)?;
        Ok(true)
    }

    async fn store(&self, user: User) -> Result<()> {
        self.put(CF_USERS, user.id.as_bytes(), &user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        self.fetch(CF_USERS, id.as_bytes())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        match self.db.get_cf(self.cf(CF_USER_EMAILS)?, email.as_bytes())? {
            Some(id) => self.fetch(CF_USERS, id),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        self.scan(CF_USERS)
    }
}

#[async_trait]
impl CategoryStore for RocksDBStore {
    async fn store(&self, category: Category) -> Result<()> {
        self.put(CF_CATEGORIES, category.id.as_bytes(), &category)
    }

    async fn get(&self, id: CategoryId) -> Result<Option<Category>> {
        self.fetch(CF_CATEGORIES, id.as_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Category>> {
        self.scan(CF_CATEGORIES)
    }
}

#[async_trait]
impl ProductStore for RocksDBStore {
    async fn store(&self, product: Product) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.put(CF_PRODUCTS, product.id.as_bytes(), &product)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        self.fetch(CF_PRODUCTS, id.as_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Product>> {
        self.scan(CF_PRODUCTS)
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        self.remove(CF_PRODUCTS, id.as_bytes())
    }

    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(mut product) = self.fetch::<Product>(CF_PRODUCTS, id.as_bytes())? else {
            return Ok(false);
        };
        if !product.has_stock(quantity) {
            return Ok(false);
        }
        product.stock -= quantity;
        product.updated_at = Utc::now();
        self.put(CF_PRODUCTS, id.as_bytes(), &product)?;
        Ok(true)
    }

    async fn restock(&self, id: ProductId, quantity: u32) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if let Some(mut product) = self.fetch::<Product>(CF_PRODUCTS, id.as_bytes())? {
            product.stock = product.stock.saturating_add(quantity);
            product.updated_at = Utc::now();
            self.put(CF_PRODUCTS, id.as_bytes(), &product)?;
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for RocksDBStore {
    async fn store(&self, item: CartItem) -> Result<()> {
        self.put(CF_CART_ITEMS, item.id.as_bytes(), &item)
    }

    async fn get(&self, id: CartItemId) -> Result<Option<CartItem>> {
        self.fetch(CF_CART_ITEMS, id.as_bytes())
    }

    async fn find(&self, user: UserId, product: ProductId) -> Result<Option<CartItem>> {
        Ok(self
            .scan::<CartItem>(CF_CART_ITEMS)?
            .into_iter()
            .find(|i| i.user_id == user && i.product_id == product))
    }

    async fn for_user(&self, user: UserId) -> Result<Vec<CartItem>> {
        Ok(self
            .scan::<CartItem>(CF_CART_ITEMS)?
            .into_iter()
            .filter(|i| i.user_id == user)
            .collect())
    }

    async fn delete(&self, id: CartItemId) -> Result<bool> {
        self.remove(CF_CART_ITEMS, id.as_bytes())
    }

    async fn clear(&self, user: UserId, products: Option<&[ProductId]>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        for item in self.scan::<CartItem>(CF_CART_ITEMS)? {
            let selected = products.is_none_or(|p| p.contains(&item.product_id));
            if item.user_id == user && selected {
                self.db.delete_cf(self.cf(CF_CART_ITEMS)?, item.id.as_bytes())?;
            }
        }
        Ok(())
    }

    async fn purge_product(&self, product: ProductId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        for item in self.scan::<CartItem>(CF_CART_ITEMS)? {
            if item.product_id == product {
                self.db.delete_cf(self.cf(CF_CART_ITEMS)?, item.id.as_bytes())?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn store(&self, order: Order) -> Result<()> {
        self.put(CF_ORDERS, order.id.as_bytes(), &order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        self.fetch(CF_ORDERS, id.as_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        self.scan(CF_ORDERS)
    }
}

#[async_trait]
impl InvoiceStore for RocksDBStore {
    async fn store(&self, invoice: Invoice) -> Result<()> {
        self.put(CF_INVOICES, invoice.id.as_bytes(), &invoice)
    }

    async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>> {
        self.fetch(CF_INVOICES, id.as_bytes())
    }

    async fn get_all(&self) -> Result<Vec<Invoice>> {
        self.scan(CF_INVOICES)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        self.put(CF_PAYMENTS, payment.reference.as_bytes(), &payment)
    }

    async fn get(&self, reference: &str) -> Result<Option<Payment>> {
        self.fetch(CF_PAYMENTS, reference.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ProductDraft;
    use crate::domain::money::Price;
    use crate::domain::user::UserRole;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in COLUMN_FAMILIES {
            assert!(store.db.cf_handle(name).is_some(), "{name} missing");
        }
    }

    #[tokio::test]
    async fn test_rocksdb_user_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let user = User::new("Ada".into(), "ada@example.com", UserRole::Buyer);
        assert!(store.insert(user.clone()).await.unwrap());
        assert!(
            !store
                .insert(User::new("Imposter".into(), "ADA@example.com", UserRole::Buyer))
                .await
                .unwrap()
        );

        let retrieved = UserStore::get(&store, user.id).await.unwrap().unwrap();
        assert_eq!(retrieved, user);
        let by_email = store.find_by_email("Ada@Example.com").await.unwrap();
        assert_eq!(by_email, Some(user));
        assert_eq!(UserStore::get_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rocksdb_stock_survives_reopen() {
        let dir = tempdir().unwrap();
        let product = Product::new(
            ProductDraft {
                name: "Projector".into(),
                description: None,
                price: Price::new(dec!(300)).unwrap(),
                sku: "PJ-1".into(),
                stock: 4,
                min_order: 1,
                category_id: Uuid::new_v4(),
                image: None,
            },
            Uuid::new_v4(),
        );

        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            ProductStore::store(&store, product.clone()).await.unwrap();
            assert!(store.decrement_stock(product.id, 3).await.unwrap());
            assert!(!store.decrement_stock(product.id, 2).await.unwrap());
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        let reopened = ProductStore::get(&store, product.id).await.unwrap().unwrap();
        assert_eq!(reopened.stock, 1);
    }
}
