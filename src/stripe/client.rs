use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StripeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Stripe API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Hosted checkout session as returned by the Stripe API. Only the fields the
/// confirmation flow reads are modeled; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub payment_method_types: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub latest_charge: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub id: String,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

/// Donor intent for a new checkout session. The metadata map round-trips the
/// original request fields through Stripe so confirmation can rebuild the
/// donor record without local state.
#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    pub payment_method: String,
    pub customer_email: String,
    pub product_name: String,
    pub unit_amount: i64,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

pub const CHECKOUT_CURRENCY: &str = "usd";

/// HTTP client for the Stripe REST API (form-encoded requests, JSON
/// responses). Constructed once at startup and shared by reference.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(base_url: String, secret_key: String) -> Result<Self, StripeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(StripeClient {
            client,
            base_url,
            secret_key,
        })
    }

    /// Opens a hosted checkout session: single line item, fixed currency,
    /// amount in minor units, intent fields embedded as metadata.
    pub async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, StripeError> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "payment_method_types[0]".to_string(),
                params.payment_method.clone(),
            ),
            ("customer_email".to_string(), params.customer_email.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                CHECKOUT_CURRENCY.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                params.product_name.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                params.unit_amount.to_string(),
            ),
            ("success_url".to_string(), params.success_url.clone()),
            ("cancel_url".to_string(), params.cancel_url.clone()),
        ];
        for (key, value) in &params.metadata {
            form.push((format!("metadata[{}]", key), value.clone()));
        }

        self.post_form("/v1/checkout/sessions", &form).await
    }

    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, StripeError> {
        self.get(&format!("/v1/checkout/sessions/{}", session_id))
            .await
    }

    pub async fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntent, StripeError> {
        self.get(&format!("/v1/payment_intents/{}", payment_intent_id))
            .await
    }

    pub async fn retrieve_charge(&self, charge_id: &str) -> Result<Charge, StripeError> {
        self.get(&format!("/v1/charges/{}", charge_id)).await
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, StripeError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn parse_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown Stripe error")
                .to_string();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_params() -> CheckoutSessionParams {
        let mut metadata = HashMap::new();
        metadata.insert("user_id".to_string(), "u1".to_string());
        metadata.insert("amount".to_string(), "50".to_string());

        CheckoutSessionParams {
            payment_method: "card".to_string(),
            customer_email: "a@x.com".to_string(),
            product_name: "Zakat".to_string(),
            unit_amount: 5000,
            success_url: "https://example.com/success".to_string(),
            cancel_url: "https://example.com/cancel".to_string(),
            metadata,
        }
    }

    #[test]
    fn test_new_builds_client_with_timeout() {
        let client = StripeClient::new(
            "https://api.stripe.com".to_string(),
            "sk_test".to_string(),
        );
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_create_checkout_session_success() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/v1/checkout/sessions")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("mode".into(), "payment".into()),
                mockito::Matcher::UrlEncoded("payment_method_types[0]".into(), "card".into()),
                mockito::Matcher::UrlEncoded(
                    "line_items[0][price_data][unit_amount]".into(),
                    "5000".into(),
                ),
                mockito::Matcher::UrlEncoded("metadata[user_id]".into(), "u1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "cs_test_1",
                    "url": "https://checkout.stripe.com/c/pay/cs_test_1",
                    "payment_status": "unpaid"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = StripeClient::new(server.url(), "sk_test".to_string()).unwrap();
        let session = client.create_checkout_session(&test_params()).await.unwrap();

        assert_eq!(session.id, "cs_test_1");
        assert_eq!(
            session.url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_test_1")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retrieve_checkout_session_defaults_missing_fields() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/v1/checkout/sessions/cs_test_2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "id": "cs_test_2", "payment_status": "paid" }).to_string())
            .create_async()
            .await;

        let client = StripeClient::new(server.url(), "sk_test".to_string()).unwrap();
        let session = client.retrieve_checkout_session("cs_test_2").await.unwrap();

        assert_eq!(session.payment_status, "paid");
        assert!(session.payment_intent.is_none());
        assert!(session.metadata.is_empty());
        assert!(session.payment_method_types.is_empty());
    }

    #[tokio::test]
    async fn test_api_error_surfaces_provider_message() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/v1/checkout/sessions/cs_missing")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "error": { "message": "No such checkout.session: cs_missing" } })
                    .to_string(),
            )
            .create_async()
            .await;

        let client = StripeClient::new(server.url(), "sk_test".to_string()).unwrap();
        let err = client
            .retrieve_checkout_session("cs_missing")
            .await
            .unwrap_err();

        match err {
            StripeError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("No such checkout.session"));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retrieve_charge_receipt_url() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/v1/charges/ch_1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "id": "ch_1", "receipt_url": "https://pay.stripe.com/receipts/r1" })
                    .to_string(),
            )
            .create_async()
            .await;

        let client = StripeClient::new(server.url(), "sk_test".to_string()).unwrap();
        let charge = client.retrieve_charge("ch_1").await.unwrap();

        assert_eq!(
            charge.receipt_url.as_deref(),
            Some("https://pay.stripe.com/receipts/r1")
        );
    }
}
