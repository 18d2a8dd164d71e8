use axum::{
    Json,
    extract::rejection::{FormRejection, JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// User-facing error messages shared between handlers and the checkout workflow.
pub mod msg {
    pub const WIDGET_NOT_FOUND: &str = "Widget not found";
    pub const RECEIPT_NOT_FOUND: &str = "No receipt to display";
    pub const INVALID_PAYMENT_AMOUNT: &str = "payment_amount must be a whole number of minor currency units";
    pub const NON_POSITIVE_AMOUNT: &str = "payment_amount must be greater than zero";
    pub const MISSING_PRODUCT: &str = "product_id is required to place an order";
    pub const UNKNOWN_PRODUCT: &str = "product_id does not match any widget";
    pub const INVALID_QUANTITY: &str = "quantity must be greater than zero";
    pub const NO_CHARGES_FOUND: &str = "no charges found for this payment intent";
    pub const CARD_DECLINED: &str = "Your card was declined";
    pub const AMOUNT_MISMATCH: &str = "payment_amount does not match the price of the order";
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A submitted field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The payment processor could not be reached or returned no usable data.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The payment processor rejected the card. Carries the customer-facing text.
    #[error("Card declined: {0}")]
    CardDeclined(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures writing to or reading from the relational store.
    pub fn is_persistence(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Pool(_))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone())),
            AppError::Validation(msg) => {
                tracing::warn!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, "Validation failed", Some(msg.clone()))
            }
            AppError::Upstream(msg) => {
                tracing::error!("Payment processor error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Payment processor unavailable", None)
            }
            AppError::CardDeclined(msg) => {
                (StatusCode::PAYMENT_REQUIRED, "Payment declined", Some(msg.clone()))
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Turns `Option<T>` lookups into `NotFound` errors.
pub trait OptionExt<T> {
    fn or_not_found(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(msg.to_string()))
    }
}
