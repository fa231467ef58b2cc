use super::marketplace::{Marketplace, Principal};
use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::domain::order::{OrderId, OrderStatus};
use crate::domain::payment::{
    DEFAULT_CURRENCY, InitializePayment, Payment, PaymentCheckout, PaymentStatus,
    PaymentVerification, payment_reference,
};
use crate::error::{MarketError, Result};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

impl Marketplace {
    /// Opens a hosted checkout for one of the caller's pending orders.
    pub async fn initialize_payment(
        &self,
        principal: &Principal,
        order_id: OrderId,
    ) -> Result<PaymentCheckout> {
        let order = self
            .stores
            .orders
            .get(order_id)
            .await?
            .filter(|o| o.user_id == principal.id())
            .ok_or_else(|| MarketError::not_found("Order not found"))?;
        if order.status != OrderStatus::Pending {
            return Err(MarketError::validation("Order cannot be paid"));
        }

        let now = Utc::now();
        let reference = payment_reference(order.id, now);
        let request = InitializePayment {
            email: principal.user.email.clone(),
            amount: order.total_amount,
            reference: reference.clone(),
            callback_url: Some(format!("{}/payment/callback", self.config.public_url)),
            metadata: json!({
                "orderId": order.id,
                "orderNumber": order.order_number,
                "userId": principal.id(),
            }),
        };
        let checkout = self.gateway.initialize(request).await.map_err(|e| {
            error!(order_id = %order.id, error = %e, "payment initialization failed");
            MarketError::Internal("Failed to initialize payment".into())
        })?;

        let payment = Payment {
            reference: reference.clone(),
            order_id: order.id,
            user_id: principal.id(),
            amount: order.total_amount,
            currency: DEFAULT_CURRENCY.into(),
            provider: self.gateway.provider(),
            status: PaymentStatus::Pending,
            authorization_url: checkout.authorization_url.clone(),
            metadata: json!({ "accessCode": checkout.access_code }),
            created_at: now,
            updated_at: now,
        };
        self.stores.payments.store(payment).await?;
        info!(order_id = %order.id, reference = %reference, "payment initialized");

        Ok(PaymentCheckout {
            authorization_url: checkout.authorization_url,
            reference,
        })
    }

    /// Asks the gateway about a reference and settles the payment.
    ///
    /// A settled payment confirms its order and leaves exactly one paid
    /// invoice behind. Verifying a completed payment again changes nothing.
    /// The payment is re-read under the write gate once the gateway answers,
    /// so of two racing verifications only one settles.
    pub async fn verify_payment(&self, reference: &str) -> Result<PaymentVerification> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(MarketError::validation("Reference is required"));
        }

        let payment = self.load_payment(reference).await?;
        if payment.status == PaymentStatus::Completed {
            return Ok(already_verified(payment));
        }

        // The gateway round trip runs outside the write gate.
        let verdict = match self.gateway.verify(reference).await {
            Ok(verdict) => verdict,
            Err(MarketError::Gateway(message)) => {
                warn!(reference, reason = %message, "gateway refused verification");
                return Err(MarketError::validation("Payment verification failed"));
            }
            Err(e) => return Err(e),
        };

        let _gate = self.write_gate.lock().await;
        let mut payment = self.load_payment(reference).await?;
        if payment.status == PaymentStatus::Completed {
            return Ok(already_verified(payment));
        }

        if verdict.settles(&payment) {
            payment.settle(PaymentStatus::Completed, verdict.raw.clone());
            self.stores.payments.store(payment.clone()).await?;
            self.settle_order(payment.order_id).await?;
            info!(reference, order_id = %payment.order_id, "payment completed");
        } else {
            if verdict.is_success() {
                warn!(
                    reference,
                    expected = payment.amount.to_minor_units(),
                    received = verdict.amount,
                    currency = %verdict.currency,
                    "gateway settled a different amount"
                );
            }
            payment.settle(PaymentStatus::Failed, verdict.raw.clone());
            self.stores.payments.store(payment.clone()).await?;
            info!(reference, status = %verdict.status, "payment failed");
        }

        Ok(PaymentVerification {
            status: verdict.status,
            message: verdict.message,
            payment,
        })
    }

    pub async fn get_payment(&self, principal: &Principal, reference: &str) -> Result<Payment> {
        let payment = self.load_payment(reference).await?;
        if payment.user_id != principal.id() && !principal.role().sees_everything() {
            return Err(MarketError::Forbidden);
        }
        Ok(payment)
    }

    async fn load_payment(&self, reference: &str) -> Result<Payment> {
        self.stores
            .payments
            .get(reference)
            .await?
            .ok_or_else(|| MarketError::not_found("Payment not found"))
    }

    /// Confirms the order and marks its invoice paid, issuing one if none is open.
    async fn settle_order(&self, order_id: OrderId) -> Result<()> {
        let now = Utc::now();
        let mut order = self.load_order(order_id).await?;
        match order.mark_paid(now) {
            Ok(()) => self.stores.orders.store(order.clone()).await?,
            Err(e) => warn!(order_id = %order.id, error = %e, "paid order left as is"),
        }

        let invoices = self.invoices_for_order(order.id).await?;
        if invoices.iter().any(|i| i.status == InvoiceStatus::Paid) {
            return Ok(());
        }
        let invoice = match invoices
            .into_iter()
            .find(|i| i.status == InvoiceStatus::Pending)
        {
            Some(mut open) => {
                open.mark_paid(now);
                open
            }
            None => Invoice::settled(&order, now)?,
        };
        self.stores.invoices.store(invoice).await
    }
}

fn already_verified(payment: Payment) -> PaymentVerification {
    PaymentVerification {
        status: "success".into(),
        message: "Payment already verified".into(),
        payment,
    }
}
