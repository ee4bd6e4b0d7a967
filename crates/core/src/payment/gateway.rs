//! Payment gateway boundary and the Stripe HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use microloan_shared::PaymentsConfig;

use super::error::PaymentError;
use super::types::{GatewayIntent, IntentRequest, METADATA_APPLICATION_ID, METADATA_KIND};

/// External card processor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a payment intent. Never touches the ledger.
    async fn create_intent(&self, request: &IntentRequest) -> Result<GatewayIntent, PaymentError>;

    /// Fetches an intent by id.
    async fn retrieve_intent(&self, intent_id: &str) -> Result<GatewayIntent, PaymentError>;
}

/// Error envelope returned by the Stripe API.
#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// `PaymentGateway` over the Stripe PaymentIntents REST API.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeGateway {
    /// Builds a client from configuration.
    ///
    /// Returns `Ok(None)` when no secret key is configured.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &PaymentsConfig) -> Result<Option<Self>, PaymentError> {
        let Some(secret_key) = config.secret_key() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        Ok(Some(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.api_base)
    }

    /// URL of one intent, with the id percent-encoded as a single segment.
    fn intent_url(&self, intent_id: &str) -> Result<reqwest::Url, PaymentError> {
        let mut url = reqwest::Url::parse(&self.url("payment_intents"))
            .map_err(|e| PaymentError::Transport(format!("invalid gateway url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| PaymentError::Transport("gateway url cannot have a path".to_string()))?
            .push(intent_id);
        Ok(url)
    }

    async fn read_intent(response: reqwest::Response) -> Result<GatewayIntent, PaymentError> {
        let status = response.status();
        if status.is_success() {
            return response.json::<GatewayIntent>().await.map_err(map_reqwest_error);
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        let message = serde_json::from_str::<StripeErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.message)
            .unwrap_or_else(|| format!("payment gateway returned {status}"));

        tracing::warn!(%status, %message, "payment gateway rejected request");
        Err(PaymentError::Rejected(message))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PaymentError {
    if err.is_timeout() {
        PaymentError::Timeout
    } else {
        PaymentError::Transport(err.to_string())
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, request: &IntentRequest) -> Result<GatewayIntent, PaymentError> {
        let form = [
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.clone()),
            (
                format!("metadata[{METADATA_APPLICATION_ID}]"),
                request.application_id.to_string(),
            ),
            (
                format!("metadata[{METADATA_KIND}]"),
                request.kind.as_str().to_string(),
            ),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];

        tracing::debug!(
            application_id = %request.application_id,
            kind = %request.kind,
            amount = request.amount,
            "creating payment intent"
        );

        let response = self
            .client
            .post(self.url("payment_intents"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        Self::read_intent(response).await
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<GatewayIntent, PaymentError> {
        let response = self
            .client
            .get(self.intent_url(intent_id)?)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        Self::read_intent(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_secret_means_no_gateway() {
        let config = PaymentsConfig::default();
        assert!(StripeGateway::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_api_base_is_normalised() {
        let config = PaymentsConfig {
            secret_key: Some("sk_test_123".into()),
            api_base: "http://localhost:12111/".into(),
            ..PaymentsConfig::default()
        };
        let gateway = StripeGateway::from_config(&config).unwrap().unwrap();
        assert_eq!(
            gateway.url("payment_intents"),
            "http://localhost:12111/v1/payment_intents"
        );
    }

    #[test]
    fn test_intent_id_is_a_single_encoded_segment() {
        let config = PaymentsConfig {
            secret_key: Some("sk_test_123".into()),
            api_base: "http://localhost:12111".into(),
            ..PaymentsConfig::default()
        };
        let gateway = StripeGateway::from_config(&config).unwrap().unwrap();

        let url = gateway.intent_url("pi_123").unwrap();
        assert_eq!(url.path(), "/v1/payment_intents/pi_123");

        let url = gateway.intent_url("pi_1/../../v1/charges?x=1").unwrap();
        assert!(url.path().starts_with("/v1/payment_intents/pi_1%2F"));
        assert_eq!(url.path_segments().unwrap().count(), 3);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_error_body_parsing() {
        let body = r#"{"error":{"message":"Amount must be at least 50 cents","type":"invalid_request_error"}}"#;
        let parsed: StripeErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.error.message.as_deref(),
            Some("Amount must be at least 50 cents")
        );
    }
}
