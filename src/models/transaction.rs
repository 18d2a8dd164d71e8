use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, FromRepr};

/// Lifecycle codes stored in `transaction_statuses`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumIter, FromRepr,
)]
#[repr(i64)]
#[strum(serialize_all = "title_case")]
pub enum TransactionStatus {
    /// Charge captured, awaiting fulfillment confirmation
    Pending = 1,
    Cleared = 2,
    Declined = 3,
    Refunded = 4,
    PartiallyRefunded = 5,
}

impl TransactionStatus {
    pub fn id(self) -> i64 {
        self as i64
    }
}

/// A recorded card payment. Never updated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    pub last_four: String,
    /// Processor charge id for the payment intent
    pub bank_return_code: String,
    pub expiry_month: i64,
    pub expiry_year: i64,
    pub payment_intent: String,
    pub payment_method: String,
    pub status: TransactionStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateTransaction {
    pub amount: i64,
    pub currency: String,
    pub last_four: String,
    pub bank_return_code: String,
    pub expiry_month: i64,
    pub expiry_year: i64,
    pub payment_intent: String,
    pub payment_method: String,
    pub status: TransactionStatus,
}
