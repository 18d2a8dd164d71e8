use chrono::Utc;
use rusqlite::{Connection, params};

use crate::error::{AppError, Result};
use crate::models::*;

use super::from_row::{
    CUSTOMER_COLS, ORDER_COLS, TRANSACTION_COLS, WIDGET_COLS, query_all, query_one,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

// ============ Widgets ============

pub fn create_widget(conn: &Connection, input: &CreateWidget) -> Result<Widget> {
    let now = now();
    conn.execute(
        "INSERT INTO widgets (name, description, inventory_level, price, image, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &input.name,
            &input.description,
            input.inventory_level,
            input.price,
            &input.image,
            now,
            now
        ],
    )?;

    Ok(Widget {
        id: conn.last_insert_rowid(),
        name: input.name.clone(),
        description: input.description.clone(),
        inventory_level: input.inventory_level,
        price: input.price,
        image: input.image.clone().unwrap_or_default(),
        created_at: now,
        updated_at: now,
    })
}

pub fn get_widget_by_id(conn: &Connection, id: i64) -> Result<Option<Widget>> {
    query_one(
        conn,
        &format!("SELECT {} FROM widgets WHERE id = ?1", WIDGET_COLS),
        &[&id],
    )
}

pub fn list_widgets(conn: &Connection) -> Result<Vec<Widget>> {
    query_all(
        conn,
        &format!("SELECT {} FROM widgets ORDER BY id", WIDGET_COLS),
        &[],
    )
}

// ============ Ledger inserts ============
//
// Each insert runs in its own transaction: dropping `tx` on an error path
// rolls back before the error propagates.

/// Insert a customer row. Always creates a new row, even for a known email.
pub fn insert_customer(conn: &mut Connection, input: &CreateCustomer) -> Result<i64> {
    let now = now();
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO customers (first_name, last_name, email, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![&input.first_name, &input.last_name, &input.email, now, now],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

pub fn insert_transaction(conn: &mut Connection, input: &CreateTransaction) -> Result<i64> {
    let now = now();
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO transactions
         (amount, currency, last_four, bank_return_code, expiry_month, expiry_year,
          payment_intent, payment_method, transaction_status_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            input.amount,
            &input.currency,
            &input.last_four,
            &input.bank_return_code,
            input.expiry_month,
            input.expiry_year,
            &input.payment_intent,
            &input.payment_method,
            input.status.id(),
            now,
            now
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

/// Insert an order. The referenced transaction and customer are expected to exist already.
pub fn insert_order(conn: &mut Connection, input: &CreateOrder) -> Result<i64> {
    let now = now();
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO orders
         (widget_id, transaction_id, customer_id, status_id, quantity, amount, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            input.widget_id,
            input.transaction_id,
            input.customer_id,
            input.status.id(),
            input.quantity,
            input.amount,
            now,
            now
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

// ============ Read-back ============

pub fn get_customer_by_id(conn: &Connection, id: i64) -> Result<Option<Customer>> {
    query_one(
        conn,
        &format!("SELECT {} FROM customers WHERE id = ?1", CUSTOMER_COLS),
        &[&id],
    )
}

pub fn get_transaction_by_id(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    query_one(
        conn,
        &format!("SELECT {} FROM transactions WHERE id = ?1", TRANSACTION_COLS),
        &[&id],
    )
}

pub fn get_order_by_id(conn: &Connection, id: i64) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLS),
        &[&id],
    )
}

pub fn list_transactions_for_payment_intent(
    conn: &Connection,
    payment_intent: &str,
) -> Result<Vec<Transaction>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM transactions WHERE payment_intent = ?1 ORDER BY id",
            TRANSACTION_COLS
        ),
        &[&payment_intent],
    )
}

/// Row count for one of the ledger tables.
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    if !matches!(table, "customers" | "transactions" | "orders" | "widgets") {
        return Err(AppError::Internal(format!("unknown table: {}", table)));
    }
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count)
}
