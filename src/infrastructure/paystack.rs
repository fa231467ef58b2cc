use crate::domain::payment::{
    InitializePayment, InitializedPayment, PaymentProvider, VerifiedPayment,
};
use crate::domain::ports::PaymentGateway;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.paystack.co";

/// Every Paystack response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    #[serde(default)]
    amount: i64,
    #[serde(default)]
    currency: String,
}

/// Paystack REST client. Amounts travel in kobo.
#[derive(Clone)]
pub struct PaystackGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl PaystackGateway {
    pub fn new(secret_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let secret_key = secret_key.into();
        if secret_key.trim().is_empty() {
            return Err(MarketError::Internal(
                "PAYSTACK_SECRET_KEY is required".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            secret_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Decodes the envelope, turning `status: false` into a gateway error.
    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<(String, T, Value)> {
        let raw: Value = response.json().await?;
        let envelope: Envelope<Value> = serde_json::from_value(raw.clone())?;
        if !envelope.status {
            return Err(MarketError::Gateway(envelope.message));
        }
        let data = envelope
            .data
            .ok_or_else(|| MarketError::Gateway(format!("{}: missing data", envelope.message)))?;
        Ok((envelope.message, serde_json::from_value(data)?, raw))
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Paystack
    }

    #[instrument(
        name = "paystack_initialize",
        skip(self, request),
        fields(reference = %request.reference)
    )]
    async fn initialize(&self, request: InitializePayment) -> Result<InitializedPayment> {
        let mut body = json!({
            "email": request.email,
            "amount": request.amount.to_minor_units(),
            "reference": request.reference,
            "metadata": request.metadata,
        });
        if let Some(callback_url) = request.callback_url {
            body["callback_url"] = Value::String(callback_url);
        }

        let response = self
            .client
            .post(self.url("/transaction/initialize"))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await?;
        let (_, data, _) = Self::unwrap_envelope::<InitializedPayment>(response)
            .await
            .inspect_err(|e| warn!(error = %e, "paystack initialize rejected"))?;
        Ok(data)
    }

    #[instrument(name = "paystack_verify", skip(self))]
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment> {
        let response = self
            .client
            .get(self.url(&format!("/transaction/verify/{reference}")))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        let (message, data, raw) = Self::unwrap_envelope::<VerifyData>(response).await?;
        Ok(VerifiedPayment {
            status: data.status,
            message,
            amount: data.amount,
            currency: data.currency,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_secret_key() {
        assert!(matches!(
            PaystackGateway::new("  ", DEFAULT_BASE_URL),
            Err(MarketError::Internal(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let gateway = PaystackGateway::new("sk_test", "http://127.0.0.1:9000/").unwrap();
        assert_eq!(
            gateway.url("/transaction/initialize"),
            "http://127.0.0.1:9000/transaction/initialize"
        );
    }

    #[test]
    fn test_envelope_parsing() {
        let envelope: Envelope<VerifyData> = serde_json::from_value(json!({
            "status": true,
            "message": "Verification successful",
            "data": {"status": "success", "amount": 150000, "currency": "NGN", "reference": "r"}
        }))
        .unwrap();
        assert!(envelope.status);
        let data = envelope.data.unwrap();
        assert_eq!(data.amount, 150_000);
        assert_eq!(data.status, "success");

        let failed: Envelope<VerifyData> = serde_json::from_value(json!({
            "status": false,
            "message": "Transaction reference not found"
        }))
        .unwrap();
        assert!(!failed.status);
        assert!(failed.data.is_none());
    }
}
