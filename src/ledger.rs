//! Single-entity writers used by the checkout workflow.
//!
//! Each ledger is the only writer of its table. Saves are independent: a
//! failed order insert does not undo the customer or transaction recorded
//! before it.

use crate::db::{DbPool, queries};
use crate::error::Result;
use crate::models::{CreateCustomer, CreateOrder, CreateTransaction, Widget};

/// Read-only product lookup.
pub trait WidgetCatalog: Send + Sync {
    fn get_widget(&self, id: i64) -> Result<Option<Widget>>;
}

pub trait CustomerLedger: Send + Sync {
    /// Record a customer and return its id. Never deduplicates.
    fn save_customer(&self, customer: &CreateCustomer) -> Result<i64>;
}

pub trait TransactionLedger: Send + Sync {
    /// Record a transaction and return its id. Every call creates a new row.
    fn save_transaction(&self, transaction: &CreateTransaction) -> Result<i64>;
}

pub trait OrderLedger: Send + Sync {
    /// Record an order and return its id. Referenced ids are not checked here.
    fn save_order(&self, order: &CreateOrder) -> Result<i64>;
}

/// All ledgers backed by the SQLite pool. Checks out one connection per call.
#[derive(Clone)]
pub struct SqliteLedger {
    pool: DbPool,
}

impl SqliteLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl WidgetCatalog for SqliteLedger {
    fn get_widget(&self, id: i64) -> Result<Option<Widget>> {
        let conn = self.pool.get()?;
        queries::get_widget_by_id(&conn, id)
    }
}

impl CustomerLedger for SqliteLedger {
    fn save_customer(&self, customer: &CreateCustomer) -> Result<i64> {
        let mut conn = self.pool.get()?;
        queries::insert_customer(&mut conn, customer)
    }
}

impl TransactionLedger for SqliteLedger {
    fn save_transaction(&self, transaction: &CreateTransaction) -> Result<i64> {
        let mut conn = self.pool.get()?;
        queries::insert_transaction(&mut conn, transaction)
    }
}

impl OrderLedger for SqliteLedger {
    fn save_order(&self, order: &CreateOrder) -> Result<i64> {
        let mut conn = self.pool.get()?;
        queries::insert_order(&mut conn, order)
    }
}
