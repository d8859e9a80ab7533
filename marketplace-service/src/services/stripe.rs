//! Stripe payment provider client.
//!
//! Implements Checkout Session creation, PaymentIntent/Charge lookups for
//! receipt URLs, and `Stripe-Signature` webhook verification.

use crate::config::StripeConfig;
use anyhow::{anyhow, Result};
use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::Sha256;

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

/// One Checkout line item; amounts are in cents.
#[derive(Debug)]
pub struct LineItem {
    pub name: String,
    pub unit_amount_cents: i64,
    pub quantity: u32,
}

/// Checkout Session as returned by session creation.
#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Amount in cents.
    pub amount: i64,
    pub latest_charge: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Charge {
    pub id: String,
    pub receipt_url: Option<String>,
}

/// Stripe API error envelope.
#[derive(Debug, Deserialize)]
struct StripeError {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: Option<String>,
}

/// Webhook event envelope. `data.object` stays untyped because its shape
/// depends on the event type.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: serde_json::Value,
}

/// The `data.object` of a `checkout.session.completed` event.
#[derive(Debug, Deserialize)]
pub struct CompletedSession {
    pub id: String,
    pub payment_intent: Option<String>,
    pub metadata: Option<SessionMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct SessionMetadata {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.secret_key.expose_secret().is_empty()
    }

    /// Create a hosted Checkout Session and return its redirect URL.
    ///
    /// Stripe's API takes form-encoded bodies with indexed bracket keys for
    /// nested arrays.
    pub async fn create_checkout_session(
        &self,
        line_items: &[LineItem],
        user_id: &str,
        order_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession> {
        if !self.is_configured() {
            return Err(anyhow!("Stripe credentials not configured"));
        }

        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            ("metadata[userId]".to_string(), user_id.to_string()),
            ("metadata[orderId]".to_string(), order_id.to_string()),
        ];

        for (i, item) in line_items.iter().enumerate() {
            params.push((
                format!("line_items[{i}][price_data][currency]"),
                "usd".to_string(),
            ));
            params.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            params.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount_cents.to_string(),
            ));
            params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        let url = format!("{}/checkout/sessions", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, "Stripe checkout session response");

        if status.is_success() {
            let session: CheckoutSession = serde_json::from_str(&body)?;
            tracing::info!(session_id = %session.id, "Stripe checkout session created");
            Ok(session)
        } else {
            Err(Self::api_error("checkout session creation", &body))
        }
    }

    pub async fn get_payment_intent(&self, intent_id: &str) -> Result<PaymentIntent> {
        let url = format!("{}/payment_intents/{}", self.config.api_base_url, intent_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(Self::api_error("payment intent fetch", &body))
        }
    }

    pub async fn get_charge(&self, charge_id: &str) -> Result<Charge> {
        let url = format!("{}/charges/{}", self.config.api_base_url, charge_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(Self::api_error("charge fetch", &body))
        }
    }

    /// Verify a `Stripe-Signature` header against the raw payload.
    ///
    /// The header carries `t=<unix>,v1=<hex>[,v1=<hex>...]`; the signed
    /// payload is `"{t}.{body}"` and the scheme is HMAC-SHA256 with the
    /// webhook secret. Any matching v1 candidate passes.
    pub fn verify_webhook_signature(&self, payload: &str, header: &str) -> Result<bool> {
        let mut timestamp: Option<&str> = None;
        let mut candidates: Vec<&str> = Vec::new();

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = Some(value),
                Some(("v1", value)) => candidates.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| anyhow!("missing timestamp in signature header"))?;
        if candidates.is_empty() {
            return Err(anyhow!("no v1 signatures in signature header"));
        }

        let signed_payload = format!("{}.{}", timestamp, payload);
        let expected = self.compute_signature(
            &signed_payload,
            self.config.webhook_secret.expose_secret(),
        )?;

        Ok(candidates.iter().any(|candidate| *candidate == expected))
    }

    pub fn parse_webhook_event(&self, payload: &str) -> Result<WebhookEvent> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Hex preview of the configured webhook secret, for signature-failure
    /// diagnostics. Deliberately partial.
    pub fn webhook_secret_preview(&self) -> String {
        let secret = self.config.webhook_secret.expose_secret();
        secret.chars().take(10).collect::<String>() + "..."
    }

    fn compute_signature(&self, payload: &str, secret: &str) -> Result<String> {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|e| anyhow!("invalid HMAC key: {}", e))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn api_error(operation: &str, body: &str) -> anyhow::Error {
        match serde_json::from_str::<StripeError>(body) {
            Ok(err) => anyhow!(
                "Stripe {} failed: {} - {}",
                operation,
                err.error.error_type,
                err.error.message.unwrap_or_default()
            ),
            Err(_) => anyhow!("Stripe {} failed: {}", operation, body),
        }
    }
}

/// Build a `Stripe-Signature` header value for `payload` at `timestamp`.
/// Shared with the webhook tests.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &str) -> String {
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(signed_payload.as_bytes());
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn client(webhook_secret: &str) -> StripeClient {
        StripeClient::new(StripeConfig {
            secret_key: Secret::new("sk_test_123".to_string()),
            webhook_secret: Secret::new(webhook_secret.to_string()),
            api_base_url: "https://api.stripe.com/v1".to_string(),
        })
    }

    #[test]
    fn valid_signature_verifies() {
        let stripe = client("whsec_test");
        let payload = r#"{"type":"checkout.session.completed"}"#;
        let header = sign_payload("whsec_test", 1_700_000_000, payload);

        assert!(stripe.verify_webhook_signature(payload, &header).unwrap());
    }

    #[test]
    fn signature_over_different_payload_fails() {
        let stripe = client("whsec_test");
        let header = sign_payload("whsec_test", 1_700_000_000, "original body");

        assert!(!stripe.verify_webhook_signature("tampered body", &header).unwrap());
    }

    #[test]
    fn signature_with_wrong_secret_fails() {
        let stripe = client("whsec_test");
        let payload = "body";
        let header = sign_payload("whsec_other", 1_700_000_000, payload);

        assert!(!stripe.verify_webhook_signature(payload, &header).unwrap());
    }

    #[test]
    fn header_without_timestamp_is_an_error() {
        let stripe = client("whsec_test");
        assert!(stripe.verify_webhook_signature("body", "v1=abcdef").is_err());
    }

    #[test]
    fn completed_session_event_parses() {
        let stripe = client("whsec_test");
        let payload = r#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_1",
                "payment_intent": "pi_1",
                "metadata": { "userId": "u-1", "orderId": "o-1" }
            }}
        }"#;

        let event = stripe.parse_webhook_event(payload).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");

        let session: CompletedSession = serde_json::from_value(event.data.object).unwrap();
        assert_eq!(session.payment_intent.as_deref(), Some("pi_1"));
        assert_eq!(
            session.metadata.unwrap().order_id.as_deref(),
            Some("o-1")
        );
    }
}
