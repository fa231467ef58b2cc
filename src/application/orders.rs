use super::marketplace::{Marketplace, Principal};
use crate::domain::catalog::ProductId;
use crate::domain::order::{
    Order, OrderAction, OrderDraft, OrderId, OrderItem, OrderQuery, OrderStatus,
    OrderStatusUpdate, OrderView,
};
use crate::domain::page::{PageRequest, Paginated};
use crate::domain::user::UserRole;
use crate::error::{MarketError, Result};
use std::cmp::Reverse;
use tracing::{info, warn};

impl Marketplace {
    /// Places an order for the caller.
    ///
    /// Every line is checked and priced before any stock moves. Stock is then taken line
    /// by line with the store's conditional decrement; if one line loses a
    /// race, the lines already taken are restocked and no order is created.
    pub async fn place_order(
        &self,
        principal: &Principal,
        draft: OrderDraft,
    ) -> Result<OrderView> {
        draft.validate()?;
        let lines = draft.merged_lines();

        let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = self
                .stores
                .products
                .get(line.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| {
                    MarketError::not_found(format!("Product {} not found", line.product_id))
                })?;
            if line.quantity < product.min_order {
                return Err(MarketError::validation(format!(
                    "Minimum order for {} is {}",
                    product.name, product.min_order
                )));
            }
            if !product.has_stock(line.quantity) {
                return Err(insufficient_stock(&product.name));
            }
            items.push(OrderItem::from_product(&product, line.quantity)?);
        }
        let order = Order::new(
            principal.id(),
            items,
            draft.shipping_address.trim().to_string(),
            draft.notes,
        )?;

        let mut taken: Vec<(ProductId, u32)> = Vec::with_capacity(order.items.len());
        for item in &order.items {
            match self
                .stores
                .products
                .decrement_stock(item.product_id, item.quantity)
                .await
            {
                Ok(true) => taken.push((item.product_id, item.quantity)),
                Ok(false) => {
                    self.restock_all(&taken).await;
                    return Err(insufficient_stock(&item.product_name));
                }
                Err(e) => {
                    self.restock_all(&taken).await;
                    return Err(e);
                }
            }
        }

        if let Err(e) = self.stores.orders.store(order.clone()).await {
            self.restock_all(&taken).await;
            return Err(e);
        }

        let ordered: Vec<ProductId> = taken.iter().map(|(id, _)| *id).collect();
        self.stores.carts.clear(principal.id(), Some(&ordered)).await?;
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_amount.0,
            "placed order"
        );
        self.order_view(order).await
    }

    /// Orders visible to the caller, newest first.
    pub async fn list_orders(
        &self,
        principal: &Principal,
        query: &OrderQuery,
        page: PageRequest,
    ) -> Result<Paginated<OrderView>> {
        let mut orders: Vec<Order> = self
            .stores
            .orders
            .get_all()
            .await?
            .into_iter()
            .filter(|o| principal.can_view_order(o))
            .filter(|o| query.status.is_none_or(|s| o.status == s))
            .collect();
        orders.sort_by_key(|o| Reverse(o.created_at));
        self.order_page(page.paginate(orders)).await
    }

    /// Every order, for the admin dashboard.
    pub async fn admin_orders(
        &self,
        principal: &Principal,
        query: &OrderQuery,
        page: PageRequest,
    ) -> Result<Paginated<OrderView>> {
        principal.require(&[UserRole::Admin])?;
        self.list_orders(principal, query, page).await
    }

    pub async fn get_order(&self, principal: &Principal, id: OrderId) -> Result<OrderView> {
        let order = self.load_order(id).await?;
        if !principal.can_view_order(&order) {
            return Err(MarketError::Forbidden);
        }
        self.order_view(order).await
    }

    pub async fn update_order_status(
        &self,
        principal: &Principal,
        id: OrderId,
        update: OrderStatusUpdate,
    ) -> Result<OrderView> {
        let order = self.load_order(id).await?;
        if !principal.can_manage_order(&order) {
            return Err(MarketError::Forbidden);
        }
        let order = self
            .transition_order(order.id, update.status, update.notes)
            .await?;
        self.order_view(order).await
    }

    /// `approve` confirms and `cancel` cancels; nothing else is accepted.
    pub async fn admin_order_action(
        &self,
        principal: &Principal,
        id: OrderId,
        action: &str,
    ) -> Result<OrderView> {
        principal.require(&[UserRole::Admin])?;
        let action: OrderAction = action.parse()?;
        let order = self
            .transition_order(id, action.target_status(), None)
            .await?;
        self.order_view(order).await
    }

    /// Applies a validated transition. Cancelling puts every line back in stock.
    ///
    /// The order is reloaded under the write gate so two cancellations
    /// cannot both restock it.
    async fn transition_order(
        &self,
        id: OrderId,
        next: OrderStatus,
        notes: Option<String>,
    ) -> Result<Order> {
        let _gate = self.write_gate.lock().await;
        let mut order = self.load_order(id).await?;
        let previous = order.status;
        order.transition(next, notes)?;
        self.stores.orders.store(order.clone()).await?;

        if next == OrderStatus::Cancelled && previous != OrderStatus::Cancelled {
            for item in &order.items {
                self.stores
                    .products
                    .restock(item.product_id, item.quantity)
                    .await?;
            }
        }
        info!(order_id = %order.id, from = ?previous, to = ?next, "order status changed");
        Ok(order)
    }

    async fn order_page(&self, page: Paginated<Order>) -> Result<Paginated<OrderView>> {
        let mut views = Vec::with_capacity(page.items.len());
        for order in page.items {
            views.push(self.order_view(order).await?);
        }
        Ok(Paginated {
            items: views,
            pagination: page.pagination,
        })
    }

    async fn restock_all(&self, taken: &[(ProductId, u32)]) {
        for (id, quantity) in taken {
            if let Err(e) = self.stores.products.restock(*id, *quantity).await {
                warn!(product_id = %id, quantity, error = %e, "failed to roll back stock");
            }
        }
    }
}

fn insufficient_stock(name: &str) -> MarketError {
    MarketError::validation(format!("Insufficient stock for {name}"))
}
