mod from_row;
mod schema;
pub mod queries;

pub use from_row::{FromRow, query_all, query_one};
pub use schema::{init_db, seed_widgets};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::ledger::SqliteLedger;
use crate::payments::PaymentProcessor;
use crate::render::Renderer;
use crate::session::SessionStore;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Shared state for both the storefront and the API server.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Payment processor used to confirm charges and create intents
    pub processor: Arc<dyn PaymentProcessor>,
    /// Per-client session values (receipt handoff lives here)
    pub sessions: SessionStore,
    pub renderer: Arc<Renderer>,
    /// Mark session cookies `Secure` (production only)
    pub secure_cookies: bool,
    /// Checkout client and other static assets
    pub static_dir: PathBuf,
}

impl AppState {
    /// Ledger writers and widget catalog over this state's pool.
    pub fn ledger(&self) -> SqliteLedger {
        SqliteLedger::new(self.db.clone())
    }
}

/// Per-connection setup: bound every statement by `timeout` and enforce foreign keys.
pub fn configure_connection(conn: &Connection, timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

pub fn create_pool(database_path: &str, timeout: Duration) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(move |conn| configure_connection(conn, timeout));
    Pool::builder()
        .max_size(10)
        .connection_timeout(timeout)
        .build(manager)
}
