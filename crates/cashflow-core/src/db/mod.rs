//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `statuses`, `transaction_types`, `categories`, `subcategories` - the
//!   classification store
//! - `integrity` - uniqueness, chain and reference checks shared by writers
//! - `transactions` - transaction CRUD and filtered listing
//! - `transaction_filter` - filter/ordering parsing and SQL building
//! - `classification_filter` - list filters for classification rows
//! - `summary` - aggregation over filtered transactions
//! - `reference` - bulk reference-data read
//! - `seed` - sample data loading
//!
//! Every write runs in a `BEGIN IMMEDIATE` transaction so that the checks it
//! performs and the write itself hold the database write lock together.

use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use crate::error::{Error, Result};

mod categories;
mod classification_filter;
mod integrity;
mod reference;
mod seed;
mod statuses;
mod subcategories;
mod summary;
mod transaction_filter;
mod transaction_types;
mod transactions;

pub use classification_filter::{ClassificationFilter, ClassificationKind};
pub use seed::{SeedOptions, SeedReport};
pub use transaction_filter::{
    FilterResult, OrderField, TransactionFilter, TransactionOrdering, TransactionQuery,
};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "CASHFLOW_DB_KEY";

/// How long a writer waits for the write lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this would invalidate all existing encrypted databases
    const APP_SALT: &[u8; 16] = b"cashflow-salt-v1";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Per-connection setup: pragmas and the `casefold` search helper
///
/// `foreign_keys` is a per-connection setting in SQLite, so it is applied
/// here rather than once in the migrations.
fn init_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // Unicode-aware lowercase; SQLite's own lower()/NOCASE only fold ASCII
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|s| s.to_lowercase()))
        },
    )?;
    Ok(())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `CASHFLOW_DB_KEY` environment variable to be set.
    /// Use `new_unencrypted()` for development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let manager = match passphrase {
            Some(pass) => {
                let key = derive_key(pass)?;
                let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

                // The key must be set before anything else touches the file
                manager.with_init(move |conn| {
                    conn.execute_batch(&key_pragma)?;
                    init_connection(conn)
                })
            }
            None => manager.with_init(init_connection),
        };

        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` so that every pooled
    /// connection sees the same data.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "cashflow_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().to_string();

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path, suffix));
        }

        Self::new_unencrypted(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run `f` inside an immediate (write-locking) transaction
    ///
    /// Commits when `f` succeeds; any error rolls everything back.
    pub(crate) fn write<T>(
        &self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run `f` inside a read transaction so multi-query reads see one snapshot
    pub(crate) fn read<T>(
        &self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let value = f(&tx)?;
        tx.finish()?;
        Ok(value)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Statuses (business, personal, tax, ...)
            CREATE TABLE IF NOT EXISTS statuses (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT ''
            );

            -- Transaction types (income, expense)
            CREATE TABLE IF NOT EXISTS transaction_types (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT ''
            );

            -- Categories, unique per transaction type.
            -- RESTRICT is a backstop; cascades are performed explicitly by the store.
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                transaction_type_id INTEGER NOT NULL
                    REFERENCES transaction_types(id) ON DELETE RESTRICT,
                description TEXT NOT NULL DEFAULT '',
                UNIQUE(name, transaction_type_id)
            );

            CREATE INDEX IF NOT EXISTS idx_categories_type ON categories(transaction_type_id);

            -- Subcategories, unique per category
            CREATE TABLE IF NOT EXISTS subcategories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                category_id INTEGER NOT NULL
                    REFERENCES categories(id) ON DELETE RESTRICT,
                description TEXT NOT NULL DEFAULT '',
                UNIQUE(name, category_id)
            );

            CREATE INDEX IF NOT EXISTS idx_subcategories_category ON subcategories(category_id);

            -- Transactions. Amount is a non-negative magnitude in minor units (cents).
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                created_at TEXT NOT NULL,
                transaction_date DATE NOT NULL,
                status_id INTEGER NOT NULL REFERENCES statuses(id) ON DELETE RESTRICT,
                transaction_type_id INTEGER NOT NULL
                    REFERENCES transaction_types(id) ON DELETE RESTRICT,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE RESTRICT,
                subcategory_id INTEGER NOT NULL REFERENCES subcategories(id) ON DELETE RESTRICT,
                amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
                comment TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(transaction_date);
            CREATE INDEX IF NOT EXISTS idx_transactions_status ON transactions(status_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_type ON transactions(transaction_type_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_subcategory ON transactions(subcategory_id);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
