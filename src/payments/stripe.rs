use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::StripeConfig;
use crate::error::{AppError, Result, msg};

use super::{CardDetails, PaymentIntent, PaymentProcessor};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Map a Stripe card error code to the message shown to the buyer.
pub fn card_error_message(code: Option<&str>) -> &'static str {
    match code {
        Some("expired_card") => "Your card is expired",
        Some("incorrect_cvc") => "Incorrect CVC code",
        Some("incorrect_zip") => "Incorrect zip/postal code",
        Some("amount_too_large") => "The amount is too much to charge to your card",
        Some("amount_too_small") => "The amount is too small to charge to your card",
        Some("balance_insufficient") => "Insufficient balance",
        Some("postal_code_invalid") => "Your postal code is invalid",
        _ => msg::CARD_DECLINED,
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeApiError,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

/// Convert a non-success Stripe response into an `AppError`.
///
/// Card errors become `CardDeclined` with a buyer-facing message; everything
/// else is an upstream failure.
fn api_error(status: reqwest::StatusCode, body: &str) -> AppError {
    match serde_json::from_str::<StripeErrorBody>(body) {
        Ok(StripeErrorBody { error }) if error.error_type.as_deref() == Some("card_error") => {
            AppError::CardDeclined(card_error_message(error.code.as_deref()).to_string())
        }
        Ok(StripeErrorBody { error }) => AppError::Upstream(format!(
            "Stripe API error ({}): {}",
            status,
            error.message.unwrap_or_default()
        )),
        Err(_) => AppError::Upstream(format!("Stripe API error ({}): {}", status, body)),
    }
}

#[derive(Debug, Deserialize)]
struct ChargeList {
    data: Vec<ChargeRef>,
}

#[derive(Debug, Deserialize)]
struct ChargeRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripePaymentMethod {
    card: Option<StripeCard>,
}

#[derive(Debug, Deserialize)]
struct StripeCard {
    last4: String,
    exp_month: i64,
    exp_year: i64,
    brand: Option<String>,
}

fn first_charge_id(list: ChargeList) -> Result<String> {
    list.data
        .into_iter()
        .next()
        .map(|charge| charge.id)
        .ok_or_else(|| AppError::Upstream(msg::NO_CHARGES_FOUND.into()))
}

fn card_details(method: StripePaymentMethod) -> Result<CardDetails> {
    let card = method
        .card
        .ok_or_else(|| AppError::Upstream("payment method has no card attached".into()))?;
    Ok(CardDetails {
        last_four: card.last4,
        exp_month: card.exp_month,
        exp_year: card.exp_year,
        brand: card.brand,
    })
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.clone(),
        }
    }

    /// Build an API URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| AppError::Internal(format!("Invalid Stripe API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Stripe API base URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Stripe response: {}", e)))
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_payment_intent(&self, currency: &str, amount: i64) -> Result<PaymentIntent> {
        let amount = amount.to_string();
        let response = self
            .client
            .post(self.endpoint(&["v1", "payment_intents"])?)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("amount", amount.as_str()),
                ("currency", currency),
                ("payment_method_types[]", "card"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe API error: {}", e)))?;

        Self::read_json(response).await
    }

    async fn retrieve_charge_id(&self, payment_intent: &str) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint(&["v1", "charges"])?)
            .basic_auth(&self.secret_key, None::<&str>)
            .query(&[("payment_intent", payment_intent), ("limit", "1")])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe API error: {}", e)))?;

        let list: ChargeList = Self::read_json(response).await?;
        first_charge_id(list)
    }

    async fn get_payment_method(&self, payment_method: &str) -> Result<CardDetails> {
        let response = self
            .client
            .get(self.endpoint(&["v1", "payment_methods", payment_method])?)
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe API error: {}", e)))?;

        let method: StripePaymentMethod = Self::read_json(response).await?;
        card_details(method)
    }
}
