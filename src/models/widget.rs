use serde::{Deserialize, Serialize};

/// A product in the store. Read-only during checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub inventory_level: i64,
    /// Unit price in minor currency units (cents)
    pub price: i64,
    pub image: String,
    #[serde(skip)]
    pub created_at: i64,
    #[serde(skip)]
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWidget {
    pub name: String,
    pub description: String,
    pub inventory_level: i64,
    pub price: i64,
    #[serde(default)]
    pub image: Option<String>,
}
