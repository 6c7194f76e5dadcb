use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use ae_core::credits::PaymentIntentResponse;
use crate::backend::ApiError;
use crate::backend::api::{CardConfirmation, CardDetails, PaymentConfirmation};

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfirmResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<ProviderError>,
}

/// Confirms a payment intent against the card provider's REST API
pub struct StripeConfirmation {
    http: reqwest::Client,
    api_base: String,
    publishable_key: Option<String>,
}

impl StripeConfirmation {
    pub fn new(http: reqwest::Client, api_base: &str, publishable_key: Option<String>) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            publishable_key,
        }
    }
}

/// `pi_123_secret_abc` → `pi_123`
pub fn intent_id(client_secret: &str) -> Option<&str> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
}

#[async_trait]
impl CardConfirmation for StripeConfirmation {
    async fn confirm(
        &self,
        intent: &PaymentIntentResponse,
        card: &CardDetails,
    ) -> Result<PaymentConfirmation, ApiError> {
        let id = intent_id(&intent.client_secret)
            .ok_or_else(|| ApiError::Decode("Malformed payment client secret".into()))?;
        let key = intent
            .public_key
            .as_deref()
            .or(self.publishable_key.as_deref())
            .ok_or_else(|| ApiError::Transport("No payment provider key configured".into()))?;

        let url = format!("{}/v1/payment_intents/{}/confirm", self.api_base, id);
        let form = [
            ("client_secret", intent.client_secret.as_str()),
            ("payment_method", card.payment_method.as_str()),
        ];
        let response = self.http.post(url).bearer_auth(key).form(&form).send().await?;
        let http_status = response.status();
        let body: ConfirmResponse = response.json().await?;
        debug!(status = ?body.status, "Payment confirmation answered");

        if let Some(error) = body.error {
            let message = error
                .message
                .unwrap_or_else(|| format!("Payment was declined (HTTP {})", http_status.as_u16()));
            warn!("Payment confirmation failed: {}", message);
            return Ok(PaymentConfirmation {
                status: body.status.unwrap_or_else(|| "failed".into()),
                error: Some(message),
            });
        }

        Ok(PaymentConfirmation {
            status: body.status.unwrap_or_default(),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_id_from_secret() {
        assert_eq!(intent_id("pi_3Nabc_secret_xyz"), Some("pi_3Nabc"));
        assert_eq!(intent_id("no-secret-here"), None);
        assert_eq!(intent_id("_secret_xyz"), None);
    }

    #[test]
    fn test_confirmation_success() {
        let ok = PaymentConfirmation {
            status: "succeeded".into(),
            error: None,
        };
        assert!(ok.succeeded());
        let pending = PaymentConfirmation {
            status: "requires_action".into(),
            error: None,
        };
        assert!(!pending.succeeded());
    }
}
