use crate::domain::catalog::{Product, ProductId, ProductView};
use crate::domain::order::{Order, OrderId, OrderView};
use crate::domain::ports::{PaymentGatewayRef, Stores};
use crate::domain::user::{PartySummary, User, UserId, UserRole, UserStatus};
use crate::error::{MarketError, Result};
use crate::infrastructure::password::PasswordHasher;
use crate::infrastructure::session::SessionSigner;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Knobs that do not belong to any single port.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Base URL the gateway redirects buyers back to.
    pub public_url: String,
    pub password_cost: u32,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:3000".into(),
            password_cost: crate::infrastructure::password::DEFAULT_COST,
        }
    }
}

/// The signed-in caller, reloaded from the user store on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user: User,
}

impl Principal {
    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == UserRole::Admin
    }

    /// `Forbidden` unless the caller holds one of `roles`.
    pub fn require(&self, roles: &[UserRole]) -> Result<()> {
        if roles.contains(&self.user.role) {
            Ok(())
        } else {
            Err(MarketError::Forbidden)
        }
    }

    /// Order visibility: buyers see their own, suppliers see orders carrying
    /// their products, admin and finance see everything.
    pub fn can_view_order(&self, order: &Order) -> bool {
        match self.user.role {
            UserRole::Admin | UserRole::Finance => true,
            UserRole::Supplier => {
                order.user_id == self.id() || order.involves_supplier(self.id())
            }
            UserRole::Buyer => order.user_id == self.id(),
        }
    }

    /// Admins manage every order; suppliers manage those carrying their products.
    pub fn can_manage_order(&self, order: &Order) -> bool {
        match self.user.role {
            UserRole::Admin => true,
            UserRole::Supplier => order.involves_supplier(self.id()),
            UserRole::Buyer | UserRole::Finance => false,
        }
    }

    pub fn can_list_products(&self) -> Result<()> {
        self.require(&[UserRole::Supplier, UserRole::Admin])?;
        if self.user.status != UserStatus::Active {
            return Err(MarketError::Forbidden);
        }
        Ok(())
    }
}

/// The marketplace service.
///
/// `Marketplace` owns every store, the payment gateway and the session signer.
/// Each public operation lives in the `impl` block of its area (auth, catalog,
/// cart, orders, billing, payments, admin) and is driven by the HTTP and CSV
/// interfaces.
pub struct Marketplace {
    pub(crate) stores: Stores,
    pub(crate) gateway: PaymentGatewayRef,
    pub(crate) sessions: SessionSigner,
    pub(crate) passwords: PasswordHasher,
    pub(crate) config: MarketplaceConfig,
    /// Serialises check-then-write sequences that the ports cannot make atomic
    /// (unique sku and category names, order transitions, payment settlement).
    /// Never held across a gateway call.
    pub(crate) write_gate: Mutex<()>,
}

impl Marketplace {
    /// Creates a new `Marketplace`.
    ///
    /// # Arguments
    ///
    /// * `stores` - Persistence ports, usually all backed by one adapter.
    /// * `gateway` - Hosted checkout provider.
    /// * `sessions` - Signer for session tokens.
    /// * `config` - Public URL and password hashing cost.
    pub fn new(
        stores: Stores,
        gateway: PaymentGatewayRef,
        sessions: SessionSigner,
        config: MarketplaceConfig,
    ) -> Self {
        Self {
            stores,
            gateway,
            sessions,
            passwords: PasswordHasher::new(config.password_cost),
            config,
            write_gate: Mutex::new(()),
        }
    }

    pub fn sessions(&self) -> &SessionSigner {
        &self.sessions
    }

    pub(crate) async fn load_user(&self, id: UserId) -> Result<User> {
        self.stores
            .users
            .get(id)
            .await?
            .ok_or_else(|| MarketError::not_found("User not found"))
    }

    pub(crate) async fn load_product(&self, id: ProductId) -> Result<Product> {
        self.stores
            .products
            .get(id)
            .await?
            .ok_or_else(|| MarketError::not_found("Product not found"))
    }

    pub(crate) async fn load_order(&self, id: OrderId) -> Result<Order> {
        self.stores
            .orders
            .get(id)
            .await?
            .ok_or_else(|| MarketError::not_found("Order not found"))
    }

    pub(crate) async fn party(&self, id: UserId) -> Result<Option<PartySummary>> {
        Ok(self
            .stores
            .users
            .get(id)
            .await?
            .as_ref()
            .map(PartySummary::from))
    }

    pub(crate) async fn product_view(&self, product: Product) -> Result<ProductView> {
        let category = self.stores.categories.get(product.category_id).await?;
        let supplier = self.party(product.supplier_id).await?;
        Ok(ProductView {
            product,
            category,
            supplier,
        })
    }

    pub(crate) async fn order_view(&self, order: Order) -> Result<OrderView> {
        let buyer = self.party(order.user_id).await?;
        let mut suppliers = BTreeMap::new();
        for item in &order.items {
            if !suppliers.contains_key(&item.supplier_id)
                && let Some(party) = self.party(item.supplier_id).await?
            {
                suppliers.insert(item.supplier_id, party);
            }
        }
        Ok(OrderView {
            order,
            buyer,
            suppliers: suppliers.into_values().collect(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::domain::catalog::{Category, CategoryDraft, ProductDraft};
    use crate::domain::money::Price;
    use crate::infrastructure::in_memory::InMemoryStore;
    use crate::infrastructure::sandbox::SandboxGateway;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    pub fn marketplace() -> (Marketplace, InMemoryStore) {
        let store = InMemoryStore::new();
        let market = Marketplace::new(
            Stores::from_adapter(store.clone()),
            Arc::new(SandboxGateway::new("http://localhost:3000")),
            SessionSigner::new("test-secret").unwrap(),
            MarketplaceConfig {
                public_url: "http://localhost:3000".into(),
                password_cost: 4,
            },
        );
        (market, store)
    }

    pub async fn principal(market: &Marketplace, role: UserRole) -> Principal {
        let mut user = User::new(
            format!("{role:?} user"),
            &format!("{}@example.com", uuid::Uuid::new_v4()),
            role,
        );
        user.status = UserStatus::Active;
        user.password_hash = Some(market.passwords.hash("password123").await.unwrap());
        assert!(market.stores.users.insert(user.clone()).await.unwrap());
        Principal { user }
    }

    pub async fn category(market: &Marketplace, name: &str) -> Category {
        let category = Category::new(CategoryDraft {
            name: name.into(),
            description: None,
            image: None,
        });
        market.stores.categories.store(category.clone()).await.unwrap();
        category
    }

    pub fn draft(category: &Category, sku: &str, price: Decimal, stock: u32) -> ProductDraft {
        ProductDraft {
            name: format!("Product {sku}"),
            description: Some(format!("Description of {sku}")),
            price: Price::new(price).unwrap(),
            sku: sku.into(),
            stock,
            min_order: 1,
            category_id: category.id,
            image: None,
        }
    }
}
