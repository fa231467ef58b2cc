use super::money::Money;
use super::order::{Order, OrderId, document_number};
use super::user::UserId;
use crate::error::MarketError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type InvoiceId = Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub status: InvoiceStatus,
    pub due_date: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// A pending invoice billed against the order's total.
    pub fn for_order(
        order: &Order,
        tax_amount: Money,
        due_date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Self, MarketError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            invoice_number: document_number("INV", now),
            order_id: order.id,
            user_id: order.user_id,
            subtotal: order.total_amount,
            tax_amount,
            total_amount: order.total_amount.checked_add(tax_amount)?,
            status: InvoiceStatus::Pending,
            due_date,
            paid_at: None,
            notes,
            created_at: now,
        })
    }

    /// The receipt issued when a gateway payment settles the order.
    pub fn settled(order: &Order, paid_at: DateTime<Utc>) -> Result<Self, MarketError> {
        let mut invoice = Self::for_order(order, Money::ZERO, paid_at, None)?;
        invoice.mark_paid(paid_at);
        Ok(invoice)
    }

    pub fn mark_paid(&mut self, at: DateTime<Utc>) {
        self.status = InvoiceStatus::Paid;
        self.paid_at = Some(at);
    }

    /// Pending invoices read as overdue once their due date has passed.
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvoiceStatus {
        if self.status == InvoiceStatus::Pending && self.due_date < now {
            InvoiceStatus::Overdue
        } else {
            self.status
        }
    }

    pub fn with_effective_status(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.effective_status(now);
        self
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub order_id: OrderId,
    pub due_date: DateTime<Utc>,
    pub tax_amount: Decimal,
    pub notes: Option<String>,
}

impl InvoiceDraft {
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.tax_amount < Decimal::ZERO {
            return Err(MarketError::validation("Tax amount cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct InvoiceQuery {
    pub status: Option<InvoiceStatus>,
}

/// Finance dashboard totals.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub invoice_count: usize,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub pending_amount: Money,
    pub overdue_amount: Money,
}

impl InvoiceSummary {
    pub fn from_invoices<'a>(
        invoices: impl IntoIterator<Item = &'a Invoice>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut summary = Self::default();
        for invoice in invoices {
            summary.invoice_count += 1;
            match invoice.effective_status(now) {
                InvoiceStatus::Cancelled => continue,
                InvoiceStatus::Paid => summary.paid_amount += invoice.total_amount,
                InvoiceStatus::Pending => summary.pending_amount += invoice.total_amount,
                InvoiceStatus::Overdue => summary.overdue_amount += invoice.total_amount,
            }
            summary.total_amount += invoice.total_amount;
        }
        summary
    }
}
