//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Map a lookup-table id column onto its status enum, surfacing unknown ids as
/// column type errors rather than panicking.
fn parse_status<T>(
    row: &Row,
    col: usize,
    col_name: &str,
    from_repr: fn(i64) -> Option<T>,
) -> rusqlite::Result<T> {
    let id: i64 = row.get(col)?;
    from_repr(id).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Integer)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const WIDGET_COLS: &str = "id, name, description, inventory_level, price, COALESCE(image, '') AS image, created_at, updated_at";

pub const CUSTOMER_COLS: &str = "id, first_name, last_name, email, created_at, updated_at";

pub const TRANSACTION_COLS: &str = "id, amount, currency, last_four, bank_return_code, expiry_month, expiry_year, payment_intent, payment_method, transaction_status_id, created_at, updated_at";

pub const ORDER_COLS: &str = "id, widget_id, transaction_id, customer_id, status_id, quantity, amount, created_at, updated_at";

// ============ FromRow Implementations ============

impl FromRow for Widget {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Widget {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            inventory_level: row.get(3)?,
            price: row.get(4)?,
            image: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl FromRow for Customer {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Customer {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl FromRow for Transaction {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Transaction {
            id: row.get(0)?,
            amount: row.get(1)?,
            currency: row.get(2)?,
            last_four: row.get(3)?,
            bank_return_code: row.get(4)?,
            expiry_month: row.get(5)?,
            expiry_year: row.get(6)?,
            payment_intent: row.get(7)?,
            payment_method: row.get(8)?,
            status: parse_status(row, 9, "transaction_status_id", TransactionStatus::from_repr)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            widget_id: row.get(1)?,
            transaction_id: row.get(2)?,
            customer_id: row.get(3)?,
            status: parse_status(row, 4, "status_id", OrderStatus::from_repr)?,
            quantity: row.get(5)?,
            amount: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}
