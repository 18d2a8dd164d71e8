use rusqlite::{Connection, params};
use strum::IntoEnumIterator;

use crate::models::{OrderStatus, TransactionStatus};

/// Initialize the storefront schema and seed the status lookup tables.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Products
        CREATE TABLE IF NOT EXISTS widgets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            inventory_level INTEGER NOT NULL DEFAULT 0,
            price INTEGER NOT NULL,           -- minor currency units
            image TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Order lifecycle codes
        CREATE TABLE IF NOT EXISTS statuses (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Transaction lifecycle codes
        CREATE TABLE IF NOT EXISTS transaction_statuses (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- No unique constraint on email: every checkout records a new customer
        CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_customers_email ON customers(email);

        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount INTEGER NOT NULL,
            currency TEXT NOT NULL,
            last_four TEXT NOT NULL,
            bank_return_code TEXT NOT NULL,
            expiry_month INTEGER NOT NULL,
            expiry_year INTEGER NOT NULL,
            payment_intent TEXT NOT NULL,
            payment_method TEXT NOT NULL,
            transaction_status_id INTEGER NOT NULL REFERENCES transaction_statuses(id),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_transactions_payment_intent ON transactions(payment_intent);

        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            widget_id INTEGER NOT NULL REFERENCES widgets(id),
            transaction_id INTEGER NOT NULL REFERENCES transactions(id),
            customer_id INTEGER NOT NULL REFERENCES customers(id),
            status_id INTEGER NOT NULL REFERENCES statuses(id),
            quantity INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_transaction ON orders(transaction_id);
        CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id);
        "#,
    )?;

    let now = chrono::Utc::now().timestamp();
    for status in OrderStatus::iter() {
        conn.execute(
            "INSERT OR IGNORE INTO statuses (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![status.id(), status.as_ref(), now],
        )?;
    }
    for status in TransactionStatus::iter() {
        conn.execute(
            "INSERT OR IGNORE INTO transaction_statuses (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![status.id(), status.as_ref(), now],
        )?;
    }

    Ok(())
}

/// Insert the demo catalog if the widgets table is empty. Returns the number inserted.
pub fn seed_widgets(conn: &Connection) -> rusqlite::Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM widgets", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(0);
    }

    let now = chrono::Utc::now().timestamp();
    let catalog = [
        ("Widget", "A very nice widget.", 10, 1000, Some("widget.png")),
        ("Golden Plan", "Get three premium widgets a month.", 100_000, 2000, None),
    ];
    for (name, description, inventory, price, image) in catalog {
        conn.execute(
            "INSERT INTO widgets (name, description, inventory_level, price, image, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![name, description, inventory, price, image, now],
        )?;
    }

    Ok(catalog.len())
}
