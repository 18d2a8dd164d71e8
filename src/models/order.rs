use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, FromRepr};

/// Lifecycle codes stored in `statuses`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumIter, FromRepr,
)]
#[repr(i64)]
#[strum(serialize_all = "title_case")]
pub enum OrderStatus {
    Cleared = 1,
    Refunded = 2,
    Cancelled = 3,
}

impl OrderStatus {
    pub fn id(self) -> i64 {
        self as i64
    }
}

/// Links a widget purchase to the transaction that paid for it and the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub widget_id: i64,
    pub transaction_id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub quantity: i64,
    pub amount: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateOrder {
    pub widget_id: i64,
    pub transaction_id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub quantity: i64,
    pub amount: i64,
}
