use crate::domain::money::Money;
use crate::domain::payment::{
    DEFAULT_CURRENCY, InitializePayment, InitializedPayment, PaymentProvider, VerifiedPayment,
};
use crate::domain::ports::PaymentGateway;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Local gateway that approves every payment it initialized.
///
/// Verification reports the amount recorded at initialization, so the
/// application's amount check behaves as it would against a real provider.
#[derive(Clone, Default)]
pub struct SandboxGateway {
    checkout_base: String,
    initialized: Arc<RwLock<HashMap<String, Money>>>,
}

impl SandboxGateway {
    pub fn new(checkout_base: impl Into<String>) -> Self {
        Self {
            checkout_base: checkout_base.into().trim_end_matches('/').to_string(),
            initialized: Arc::default(),
        }
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Sandbox
    }

    async fn initialize(&self, request: InitializePayment) -> Result<InitializedPayment> {
        debug!(reference = %request.reference, amount = %request.amount.0, "sandbox checkout");
        self.initialized
            .write()
            .await
            .insert(request.reference.clone(), request.amount);
        Ok(InitializedPayment {
            authorization_url: format!(
                "{}/sandbox/checkout/{}",
                self.checkout_base, request.reference
            ),
            access_code: None,
            reference: request.reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedPayment> {
        let amount = self
            .initialized
            .read()
            .await
            .get(reference)
            .copied()
            .ok_or_else(|| MarketError::Gateway("Transaction reference not found".into()))?;
        let minor = amount.to_minor_units();
        Ok(VerifiedPayment {
            status: "success".into(),
            message: "Verification successful".into(),
            amount: minor,
            currency: DEFAULT_CURRENCY.into(),
            raw: json!({
                "status": "success",
                "reference": reference,
                "amount": minor,
                "currency": DEFAULT_CURRENCY,
                "channel": "sandbox",
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_sandbox_approves_initialized_reference() {
        let gateway = SandboxGateway::new("http://localhost:3000/");
        let init = gateway
            .initialize(InitializePayment {
                email: "buyer@example.com".into(),
                amount: Money::new(dec!(99.99)),
                reference: "order_x_1".into(),
                callback_url: None,
                metadata: json!({}),
            })
            .await
            .unwrap();
        assert_eq!(
            init.authorization_url,
            "http://localhost:3000/sandbox/checkout/order_x_1"
        );

        let verdict = gateway.verify("order_x_1").await.unwrap();
        assert!(verdict.is_success());
        assert_eq!(verdict.amount, 9_999);
        assert_eq!(verdict.currency, "NGN");
    }

    #[tokio::test]
    async fn test_sandbox_rejects_unknown_reference() {
        let gateway = SandboxGateway::default();
        assert!(matches!(
            gateway.verify("nope").await,
            Err(MarketError::Gateway(_))
        ));
    }
}
