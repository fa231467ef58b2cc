use super::marketplace::{Marketplace, Principal};
use crate::domain::cart::{AddToCart, CartItem, CartItemId, CartLine, CartSummary};
use crate::domain::catalog::Product;
use crate::error::{MarketError, Result};
use std::cmp::Reverse;

impl Marketplace {
    /// The caller's cart, most recently added first.
    pub async fn cart(&self, principal: &Principal) -> Result<CartSummary> {
        let mut items = self.stores.carts.for_user(principal.id()).await?;
        items.sort_by_key(|i| Reverse(i.created_at));

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            // Deleted products are purged from carts, so a miss is a concurrent delete.
            if let Some(product) = self.stores.products.get(item.product_id).await? {
                lines.push(self.cart_line(item, product).await?);
            }
        }
        Ok(CartSummary::new(lines))
    }

    /// Adds a product or bumps the quantity of its existing line.
    pub async fn add_to_cart(
        &self,
        principal: &Principal,
        request: AddToCart,
    ) -> Result<CartLine> {
        if request.quantity < 1 {
            return Err(MarketError::validation("Quantity must be at least 1"));
        }
        let product = self
            .stores
            .products
            .get(request.product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| MarketError::not_found("Product not found"))?;

        let item = match self
            .stores
            .carts
            .find(principal.id(), product.id)
            .await?
        {
            Some(mut existing) => {
                existing.merge(request.quantity);
                existing
            }
            None => CartItem::new(principal.id(), product.id, request.quantity),
        };
        let line = self.cart_line(item, product).await?;
        self.stores.carts.store(line.item.clone()).await?;
        Ok(line)
    }

    pub async fn update_cart_item(
        &self,
        principal: &Principal,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartLine> {
        if quantity < 1 {
            return Err(MarketError::validation("Quantity must be at least 1"));
        }
        let mut item = self.owned_cart_item(principal, id).await?;
        item.set_quantity(quantity);
        let product = self.load_product(item.product_id).await?;
        let line = self.cart_line(item, product).await?;
        self.stores.carts.store(line.item.clone()).await?;
        Ok(line)
    }

    pub async fn remove_cart_item(&self, principal: &Principal, id: CartItemId) -> Result<()> {
        let item = self.owned_cart_item(principal, id).await?;
        self.stores.carts.delete(item.id).await?;
        Ok(())
    }

    pub async fn clear_cart(&self, principal: &Principal) -> Result<()> {
        self.stores.carts.clear(principal.id(), None).await
    }

    /// Someone else's line is reported as missing.
    async fn owned_cart_item(&self, principal: &Principal, id: CartItemId) -> Result<CartItem> {
        self.stores
            .carts
            .get(id)
            .await?
            .filter(|item| item.user_id == principal.id())
            .ok_or_else(|| MarketError::not_found("Cart item not found"))
    }

    /// Fails when the line total is out of range, before anything is stored.
    async fn cart_line(&self, item: CartItem, product: Product) -> Result<CartLine> {
        let line_total = product.price.line_total(item.quantity)?;
        Ok(CartLine {
            item,
            product: self.product_view(product).await?,
            line_total,
        })
    }
}
