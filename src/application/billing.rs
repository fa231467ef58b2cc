use super::marketplace::{Marketplace, Principal};
use crate::domain::invoice::{Invoice, InvoiceDraft, InvoiceQuery, InvoiceSummary};
use crate::domain::money::Money;
use crate::domain::order::{Order, OrderId};
use crate::domain::page::{PageRequest, Paginated};
use crate::domain::user::UserRole;
use crate::error::{MarketError, Result};
use chrono::Utc;
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::info;

impl Marketplace {
    /// Invoices whose order the caller may see, newest first. Status filters
    /// match the effective status, so `OVERDUE` finds late pending invoices.
    pub async fn list_invoices(
        &self,
        principal: &Principal,
        query: &InvoiceQuery,
        page: PageRequest,
    ) -> Result<Paginated<Invoice>> {
        let now = Utc::now();
        let orders: HashMap<OrderId, Order> = self
            .stores
            .orders
            .get_all()
            .await?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();

        let mut invoices: Vec<Invoice> = self
            .stores
            .invoices
            .get_all()
            .await?
            .into_iter()
            .filter(|invoice| match orders.get(&invoice.order_id) {
                Some(order) => principal.can_view_order(order),
                None => principal.role().sees_everything(),
            })
            .map(|invoice| invoice.with_effective_status(now))
            .filter(|invoice| query.status.is_none_or(|s| invoice.status == s))
            .collect();
        invoices.sort_by_key(|i| Reverse(i.created_at));
        Ok(page.paginate(invoices))
    }

    /// Bills an order. Subtotal is the order total; tax comes on top.
    pub async fn create_invoice(
        &self,
        principal: &Principal,
        draft: InvoiceDraft,
    ) -> Result<Invoice> {
        principal.require(&[UserRole::Admin, UserRole::Supplier])?;
        draft.validate()?;
        let order = self.load_order(draft.order_id).await?;
        if !principal.can_manage_order(&order) {
            return Err(MarketError::Forbidden);
        }

        let invoice = Invoice::for_order(
            &order,
            Money::new(draft.tax_amount),
            draft.due_date,
            draft.notes,
        )?;
        self.stores.invoices.store(invoice.clone()).await?;
        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            order_id = %order.id,
            "issued invoice"
        );
        Ok(invoice)
    }

    pub async fn invoice_summary(&self, principal: &Principal) -> Result<InvoiceSummary> {
        principal.require(&[UserRole::Finance, UserRole::Admin])?;
        let invoices = self.stores.invoices.get_all().await?;
        Ok(InvoiceSummary::from_invoices(&invoices, Utc::now()))
    }

    /// Invoices raised against one order.
    pub(crate) async fn invoices_for_order(&self, order_id: OrderId) -> Result<Vec<Invoice>> {
        Ok(self
            .stores
            .invoices
            .get_all()
            .await?
            .into_iter()
            .filter(|i| i.order_id == order_id)
            .collect())
    }
}
