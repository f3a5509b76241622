//! Payment provider integration.
//!
//! Wraps a NOWPayments-compatible JSON API behind a trait so order flows
//! stay independent of the concrete gateway and tests can run against a
//! stub.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use shoutly_common::config::PaymentConfig;
use shoutly_common::{AppError, AppResult};

/// Retries per provider call after the first attempt.
const MAX_PROVIDER_RETRIES: u32 = 2;

/// Statuses the provider reports once a payment has settled.
const SETTLED_STATUSES: [&str; 3] = ["finished", "confirmed", "sending"];

/// Request to create a hosted payment for an order.
#[derive(Debug, Clone)]
pub struct CreatePaymentRequest {
    /// Public order number, used as the provider-side order reference.
    pub order_number: String,
    pub amount: Decimal,
    pub description: String,
}

/// Provider-issued payment details returned at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(deserialize_with = "opaque_id")]
    pub payment_id: String,
    #[serde(default)]
    pub pay_url: Option<String>,
    #[serde(default)]
    pub pay_address: Option<String>,
    #[serde(default)]
    pub pay_amount: Option<f64>,
    #[serde(default)]
    pub pay_currency: Option<String>,
}

/// Provider-side state of an existing payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInfo {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub price_amount: Option<f64>,
    #[serde(default)]
    pub price_currency: Option<String>,
    pub payment_status: String,
}

impl PaymentInfo {
    /// Whether the provider considers the payment settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        SETTLED_STATUSES.contains(&self.payment_status.as_str())
    }
}

/// Trait for payment providers.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a hosted payment for an order.
    async fn create_payment(&self, request: &CreatePaymentRequest) -> AppResult<PaymentDetails>;

    /// Fetch the current provider-side state of a payment.
    async fn get_payment(&self, payment_id: &str) -> AppResult<PaymentInfo>;
}

/// NOWPayments-compatible API client.
#[derive(Clone)]
pub struct NowPaymentsProvider {
    http_client: Arc<reqwest::Client>,
    base_url: String,
    api_key: String,
    price_currency: String,
    pay_currency: String,
    success_url: String,
    cancel_url: String,
}

impl NowPaymentsProvider {
    /// Create a provider client. `server_url` is the public base URL the
    /// provider redirects buyers back to.
    #[must_use]
    #[allow(clippy::expect_used)] // Client build only fails with incompatible TLS settings
    pub fn new(config: &PaymentConfig, server_url: &str) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        let server_url = server_url.trim_end_matches('/');

        Self {
            http_client: Arc::new(http_client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            price_currency: config.price_currency.clone(),
            pay_currency: config.pay_currency.clone(),
            success_url: format!("{server_url}/api/payments/success"),
            cancel_url: format!("{server_url}/api/payments/cancel"),
        }
    }

    /// Attempt a single payment creation.
    async fn create_once(&self, request: &CreatePaymentRequest) -> AppResult<PaymentDetails> {
        let body = json!({
            "price_amount": request.amount,
            "price_currency": self.price_currency,
            "pay_currency": self.pay_currency,
            "order_id": request.order_number,
            "order_description": request.description,
            "success_url": self.success_url,
            "cancel_url": self.cancel_url,
        });

        let response = self
            .http_client
            .post(format!("{}/v1/payment", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Payment request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "Payment creation returned HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid payment response: {e}")))
    }

    /// Attempt a single payment lookup.
    async fn get_once(&self, payment_id: &str) -> AppResult<PaymentInfo> {
        let response = self
            .http_client
            .get(format!("{}/v1/payment/{payment_id}", self.base_url))
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Payment lookup failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "Payment lookup returned HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid payment response: {e}")))
    }
}

#[async_trait]
impl PaymentProvider for NowPaymentsProvider {
    async fn create_payment(&self, request: &CreatePaymentRequest) -> AppResult<PaymentDetails> {
        if self.api_key.is_empty() {
            return Err(AppError::ExternalService(
                "Payment provider API key not configured".to_string(),
            ));
        }

        let mut retry_count = 0;
        loop {
            match self.create_once(request).await {
                Ok(details) => {
                    tracing::info!(
                        order_number = %request.order_number,
                        payment_id = %details.payment_id,
                        "Payment created"
                    );
                    return Ok(details);
                }
                Err(e) => {
                    retry_count += 1;

                    if retry_count > MAX_PROVIDER_RETRIES {
                        tracing::warn!(
                            order_number = %request.order_number,
                            error = %e,
                            "Payment creation failed after max retries"
                        );
                        return Err(e);
                    }

                    // Backoff delay: 2^retry_count seconds (2, 4)
                    let delay_secs = 2u64.pow(retry_count);
                    tracing::debug!(
                        order_number = %request.order_number,
                        retry_count,
                        delay_secs,
                        error = %e,
                        "Payment creation failed, retrying"
                    );

                    tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                }
            }
        }
    }

    async fn get_payment(&self, payment_id: &str) -> AppResult<PaymentInfo> {
        if self.api_key.is_empty() {
            return Err(AppError::ExternalService(
                "Payment provider API key not configured".to_string(),
            ));
        }

        let mut retry_count = 0;
        loop {
            match self.get_once(payment_id).await {
                Ok(info) => return Ok(info),
                Err(e) => {
                    retry_count += 1;

                    if retry_count > MAX_PROVIDER_RETRIES {
                        tracing::warn!(
                            payment_id,
                            error = %e,
                            "Payment lookup failed after max retries"
                        );
                        return Err(e);
                    }

                    let delay_secs = 2u64.pow(retry_count);
                    tracing::debug!(
                        payment_id,
                        retry_count,
                        delay_secs,
                        error = %e,
                        "Payment lookup failed, retrying"
                    );

                    tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                }
            }
        }
    }
}

/// The provider reports payment IDs as numbers in some responses and as
/// strings in others; store them as opaque strings either way.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number payment id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settled(status: &str) -> bool {
        PaymentInfo {
            order_id: None,
            price_amount: None,
            price_currency: None,
            payment_status: status.to_string(),
        }
        .is_settled()
    }

    #[test]
    fn test_settled_statuses() {
        assert!(settled("finished"));
        assert!(settled("confirmed"));
        assert!(settled("sending"));
    }

    #[test]
    fn test_unsettled_statuses() {
        assert!(!settled("waiting"));
        assert!(!settled("confirming"));
        assert!(!settled("partially_paid"));
        assert!(!settled("failed"));
        assert!(!settled("expired"));
    }

    #[test]
    fn test_payment_details_numeric_id() {
        let details: PaymentDetails = serde_json::from_value(json!({
            "payment_id": 5_745_459_419_u64,
            "pay_address": "3EZ2uTdVDAMFXTfc6uLDDKR6o8qKBZXVkj",
            "pay_amount": 0.001,
            "pay_currency": "btc"
        }))
        .unwrap();

        assert_eq!(details.payment_id, "5745459419");
        assert!(details.pay_url.is_none());
        assert_eq!(details.pay_currency.as_deref(), Some("btc"));
    }

    #[test]
    fn test_payment_details_string_id() {
        let details: PaymentDetails = serde_json::from_value(json!({
            "payment_id": "abc123",
            "pay_url": "https://pay.example.com/abc123"
        }))
        .unwrap();

        assert_eq!(details.payment_id, "abc123");
        assert_eq!(details.pay_url.as_deref(), Some("https://pay.example.com/abc123"));
    }

    #[test]
    fn test_payment_info_minimal_body() {
        let info: PaymentInfo =
            serde_json::from_value(json!({ "payment_status": "waiting" })).unwrap();

        assert_eq!(info.payment_status, "waiting");
        assert!(info.order_id.is_none());
        assert!(!info.is_settled());
    }

    #[tokio::test]
    async fn test_create_payment_requires_api_key() {
        let provider = NowPaymentsProvider::new(&PaymentConfig::default(), "https://example.com");

        let request = CreatePaymentRequest {
            order_number: "SO-0011223344556677A".to_string(),
            amount: dec!(25.00),
            description: "Shoutout: Birthday greeting by tester".to_string(),
        };

        let result = provider.create_payment(&request).await;
        match result {
            Err(AppError::ExternalService(msg)) => {
                assert!(msg.contains("API key not configured"));
            }
            _ => panic!("Expected ExternalService error"),
        }
    }

    #[tokio::test]
    async fn test_get_payment_requires_api_key() {
        let provider = NowPaymentsProvider::new(&PaymentConfig::default(), "https://example.com");

        let result = provider.get_payment("12345").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_callback_urls_from_server_url() {
        let provider = NowPaymentsProvider::new(&PaymentConfig::default(), "https://example.com/");

        assert_eq!(provider.success_url, "https://example.com/api/payments/success");
        assert_eq!(provider.cancel_url, "https://example.com/api/payments/cancel");
    }
}
