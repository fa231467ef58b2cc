use super::marketplace::{Marketplace, Principal};
use crate::domain::catalog::{
    Category, CategoryDraft, CategoryView, Product, ProductDraft, ProductId, ProductQuery,
    ProductView,
};
use crate::domain::page::{PageRequest, Paginated};
use crate::domain::user::{User, UserRole, UserStatus, normalize_email};
use crate::error::{MarketError, Result};
use std::cmp::Reverse;
use tracing::info;

impl Marketplace {
    /// Active categories by name, each with its count of active products.
    pub async fn list_categories(&self) -> Result<Vec<CategoryView>> {
        let products = self.stores.products.get_all().await?;
        let mut categories: Vec<CategoryView> = self
            .stores
            .categories
            .get_all()
            .await?
            .into_iter()
            .filter(|c| c.is_active)
            .map(|category| CategoryView {
                product_count: products
                    .iter()
                    .filter(|p| p.is_active && p.category_id == category.id)
                    .count(),
                category,
            })
            .collect();
        categories.sort_by_key(|c| c.category.name.to_lowercase());
        Ok(categories)
    }

    pub async fn create_category(
        &self,
        principal: &Principal,
        draft: CategoryDraft,
    ) -> Result<Category> {
        principal.require(&[UserRole::Admin])?;
        draft.validate()?;

        let _gate = self.write_gate.lock().await;
        if self.find_category(&draft.name).await?.is_some() {
            return Err(MarketError::validation("Category already exists"));
        }
        let category = Category::new(draft);
        self.stores.categories.store(category.clone()).await?;
        info!(category_id = %category.id, name = %category.name, "created category");
        Ok(category)
    }

    /// Active products, newest first.
    pub async fn list_products(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> Result<Paginated<ProductView>> {
        let category_id = match query.category.as_deref().filter(|c| !c.is_empty()) {
            Some(name) => match self.find_category(name).await? {
                Some(category) => Some(category.id),
                None => return Ok(page.paginate(Vec::new())),
            },
            None => None,
        };

        let mut products: Vec<Product> = self
            .stores
            .products
            .get_all()
            .await?
            .into_iter()
            .filter(|p| p.is_active)
            .filter(|p| category_id.is_none_or(|id| p.category_id == id))
            .filter(|p| query.supplier_id.is_none_or(|id| p.supplier_id == id))
            .filter(|p| {
                query
                    .search
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .is_none_or(|s| p.matches_search(s))
            })
            .collect();
        products.sort_by_key(|p| Reverse(p.created_at));

        let page = page.paginate(products);
        let mut views = Vec::with_capacity(page.items.len());
        for product in page.items {
            views.push(self.product_view(product).await?);
        }
        Ok(Paginated {
            items: views,
            pagination: page.pagination,
        })
    }

    pub async fn get_product(&self, id: ProductId) -> Result<ProductView> {
        let product = self.load_product(id).await?;
        self.product_view(product).await
    }

    /// Lists a product under the caller. Pending suppliers are refused.
    pub async fn create_product(
        &self,
        principal: &Principal,
        draft: ProductDraft,
    ) -> Result<ProductView> {
        principal.can_list_products()?;
        draft.validate()?;
        self.ensure_category_exists(&draft).await?;

        let gate = self.write_gate.lock().await;
        self.ensure_unique_sku(&draft.sku, None).await?;
        let product = Product::new(draft, principal.id());
        self.stores.products.store(product.clone()).await?;
        info!(
            product_id = %product.id,
            sku = %product.sku,
            supplier_id = %product.supplier_id,
            "listed product"
        );
        drop(gate);

        self.product_view(product).await
    }

    pub async fn update_product(
        &self,
        principal: &Principal,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<ProductView> {
        let mut product = self.load_product(id).await?;
        Self::ensure_owner(principal, &product)?;
        draft.validate()?;
        self.ensure_category_exists(&draft).await?;

        let gate = self.write_gate.lock().await;
        self.ensure_unique_sku(&draft.sku, Some(product.id)).await?;
        product.apply(draft);
        self.stores.products.store(product.clone()).await?;
        drop(gate);

        self.product_view(product).await
    }

    /// Removes the product and every cart line pointing at it. Orders keep
    /// their own snapshot.
    pub async fn delete_product(&self, principal: &Principal, id: ProductId) -> Result<()> {
        let product = self.load_product(id).await?;
        Self::ensure_owner(principal, &product)?;
        if !self.stores.products.delete(id).await? {
            return Err(MarketError::not_found("Product not found"));
        }
        self.stores.carts.purge_product(id).await?;
        info!(product_id = %id, "deleted product");
        Ok(())
    }

    /// Finds a supplier by email, creating a password-less account for it
    /// when missing. Used by catalog imports run by the operator.
    pub async fn ensure_supplier(&self, email: &str) -> Result<User> {
        if let Some(user) = self.stores.users.find_by_email(email).await? {
            if user.role != UserRole::Supplier && user.role != UserRole::Admin {
                return Err(MarketError::validation(format!(
                    "{} is not a supplier account",
                    user.email
                )));
            }
            return Ok(user);
        }

        let email = normalize_email(email);
        let name = email.split('@').next().unwrap_or(&email).to_string();
        let mut supplier = User::new(name, &email, UserRole::Supplier);
        supplier.status = UserStatus::Active;
        if !self.stores.users.insert(supplier.clone()).await? {
            return self
                .stores
                .users
                .find_by_email(&email)
                .await?
                .ok_or_else(|| MarketError::Internal(format!("supplier {email} vanished")));
        }
        info!(user_id = %supplier.id, email = %supplier.email, "created supplier for import");
        Ok(supplier)
    }

    /// Creates the category on first use.
    pub async fn ensure_category(&self, name: &str) -> Result<Category> {
        let draft = CategoryDraft {
            name: name.to_string(),
            description: None,
            image: None,
        };
        draft.validate()?;

        let _gate = self.write_gate.lock().await;
        if let Some(category) = self.find_category(name).await? {
            return Ok(category);
        }
        let category = Category::new(draft);
        self.stores.categories.store(category.clone()).await?;
        Ok(category)
    }

    /// Inserts or updates the supplier's product with the draft's sku.
    /// A sku owned by another supplier is a conflict.
    pub async fn upsert_product(&self, supplier: &User, draft: ProductDraft) -> Result<Product> {
        draft.validate()?;

        let _gate = self.write_gate.lock().await;
        let sku = draft.sku.trim().to_string();
        let existing = self
            .stores
            .products
            .get_all()
            .await?
            .into_iter()
            .find(|p| p.sku.eq_ignore_ascii_case(&sku));

        let product = match existing {
            Some(mut product) if product.supplier_id == supplier.id => {
                product.apply(draft);
                product
            }
            Some(_) => {
                return Err(MarketError::conflict(format!(
                    "SKU {sku} belongs to another supplier"
                )));
            }
            None => Product::new(draft, supplier.id),
        };
        self.stores.products.store(product.clone()).await?;
        Ok(product)
    }

    /// Every product with category and supplier resolved, ordered by sku.
    pub async fn catalog_snapshot(&self) -> Result<Vec<ProductView>> {
        let mut products = self.stores.products.get_all().await?;
        products.sort_by(|a, b| a.sku.cmp(&b.sku));
        let mut views = Vec::with_capacity(products.len());
        for product in products {
            views.push(self.product_view(product).await?);
        }
        Ok(views)
    }

    async fn find_category(&self, name: &str) -> Result<Option<Category>> {
        let name = name.trim();
        Ok(self
            .stores
            .categories
            .get_all()
            .await?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    async fn ensure_category_exists(&self, draft: &ProductDraft) -> Result<()> {
        match self.stores.categories.get(draft.category_id).await? {
            Some(_) => Ok(()),
            None => Err(MarketError::not_found("Category not found")),
        }
    }

    async fn ensure_unique_sku(&self, sku: &str, except: Option<ProductId>) -> Result<()> {
        let sku = sku.trim();
        let taken = self
            .stores
            .products
            .get_all()
            .await?
            .iter()
            .any(|p| p.sku.eq_ignore_ascii_case(sku) && Some(p.id) != except);
        if taken {
            return Err(MarketError::validation("Product with this SKU already exists"));
        }
        Ok(())
    }

    fn ensure_owner(principal: &Principal, product: &Product) -> Result<()> {
        if principal.is_admin() || product.supplier_id == principal.id() {
            Ok(())
        } else {
            Err(MarketError::Forbidden)
        }
    }
}
