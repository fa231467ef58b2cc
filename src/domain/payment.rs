use super::money::Money;
use super::order::OrderId;
use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_CURRENCY: &str = "NGN";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentProvider {
    Paystack,
    Sandbox,
}

/// A checkout attempt against the gateway, keyed by its reference.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub reference: String,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub amount: Money,
    pub currency: String,
    pub provider: PaymentProvider,
    pub status: PaymentStatus,
    pub authorization_url: String,
    /// Last gateway payload seen for this reference.
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn settle(&mut self, status: PaymentStatus, metadata: Value) {
        self.status = status;
        self.metadata = metadata;
        self.updated_at = Utc::now();
    }
}

/// `order_<order id>_<millis>`
pub fn payment_reference(order_id: OrderId, at: DateTime<Utc>) -> String {
    format!("order_{}_{}", order_id, at.timestamp_millis())
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InitializePayment {
    pub email: String,
    pub amount: Money,
    pub reference: String,
    pub callback_url: Option<String>,
    pub metadata: Value,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InitializedPayment {
    pub authorization_url: String,
    pub access_code: Option<String>,
    pub reference: String,
}

/// Gateway verdict on a reference.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPayment {
    /// Gateway transaction status, `success` when settled.
    pub status: String,
    pub message: String,
    /// Amount in minor units (kobo).
    pub amount: i64,
    pub currency: String,
    pub raw: Value,
}

impl VerifiedPayment {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// True when the gateway settled exactly what was asked for.
    pub fn settles(&self, payment: &Payment) -> bool {
        self.is_success()
            && self.amount == payment.amount.to_minor_units()
            && self.currency.eq_ignore_ascii_case(&payment.currency)
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCheckout {
    pub authorization_url: String,
    pub reference: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    pub status: String,
    pub message: String,
    pub payment: Payment,
}
