mod stripe;

pub use stripe::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A payment intent as returned to the browser, which confirms it client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

/// Card metadata attached to a payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub last_four: String,
    pub exp_month: i64,
    pub exp_year: i64,
    #[serde(default)]
    pub brand: Option<String>,
}

/// The payment processor as seen by the storefront.
///
/// Lookups fail with `AppError::Upstream`; card rejections while creating an
/// intent fail with `AppError::CardDeclined`.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_payment_intent(&self, currency: &str, amount: i64) -> Result<PaymentIntent>;

    /// Charge id of the first charge made against `payment_intent`.
    async fn retrieve_charge_id(&self, payment_intent: &str) -> Result<String>;

    async fn get_payment_method(&self, payment_method: &str) -> Result<CardDetails>;
}
