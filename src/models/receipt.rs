use serde::{Deserialize, Serialize};

/// Everything the receipt page shows after a successful checkout.
///
/// Staged in the buyer's session and consumed by the first receipt view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub cardholder_name: Option<String>,
    pub payment_intent: String,
    pub payment_method: String,
    pub amount: i64,
    pub currency: String,
    pub last_four: String,
    pub expiry_month: i64,
    pub expiry_year: i64,
    pub bank_return_code: String,
    pub transaction_id: i64,
    /// Absent for virtual terminal charges
    pub customer_id: Option<i64>,
    pub order_id: Option<i64>,
    pub widget_name: Option<String>,
    pub quantity: Option<i64>,
}
