use axum::extract::State;
use serde::Deserialize;

use crate::checkout::parse_amount;
use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::payments::PaymentIntent;

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    /// Minor currency units as a string, e.g. "2000"
    pub amount: String,
    pub currency: String,
}

pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntent>> {
    let amount = parse_amount(&request.amount)?;
    let currency = request.currency.trim();
    if currency.is_empty() {
        return Err(AppError::Validation("currency is required".into()));
    }

    let intent = state
        .processor
        .create_payment_intent(&currency.to_lowercase(), amount)
        .await?;
    tracing::debug!(payment_intent = %intent.id, amount, "Payment intent created");

    Ok(Json(intent))
}
