//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `questionnaires` - Questionnaires and their per-question answers
//! - `audit` - Audit log of API and CLI access

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};

mod audit;
mod questionnaires;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "COVERMAP_DB_KEY";

/// Derive a 256-bit SQLCipher key (hex) from a passphrase with Argon2id
///
/// The salt is fixed per application so a passphrase opens the database
/// wherever the file is moved.
fn derive_key(passphrase: &str) -> Result<String> {
    // Changing this would invalidate all existing encrypted databases
    const APP_SALT: &[u8; 16] = b"covermap-salt-v1";

    let mut key = [0u8; 32];
    argon2::Argon2::default()
        .hash_password_into(passphrase.as_bytes(), APP_SALT, &mut key)
        .map_err(|e| Error::DatabaseKey(format!("key derivation failed: {}", e)))?;

    Ok(hex::encode(key))
}

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    db_path: String,
    encrypted: bool,
}

/// Applied to every pooled connection; SQLite scopes these per connection
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

impl Database {
    /// Open an encrypted database keyed by `COVERMAP_DB_KEY`
    ///
    /// Fails when the variable is unset; use `new_unencrypted()` for
    /// development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        let passphrase = std::env::var(DB_KEY_ENV).map_err(|_| {
            Error::DatabaseKey(format!(
                "set {} to your passphrase, or pass --no-encrypt for a plain database",
                DB_KEY_ENV
            ))
        })?;
        Self::new_with_key(path, Some(&passphrase))
    }

    /// Open without SQLCipher keying
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open with an explicit passphrase (`None` = unencrypted)
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let mut init = String::new();
        if let Some(pass) = passphrase {
            // The key pragma must come first on a fresh connection
            init.push_str(&format!("PRAGMA key = \"x'{}'\";", derive_key(pass)?));
        }
        init.push_str(CONNECTION_PRAGMAS);

        let manager = SqliteConnectionManager::file(path)
            .with_init(move |conn| conn.execute_batch(&init));
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
            encrypted: passphrase.is_some(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because each pooled
    /// connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "covermap_test_{}_{}.db",
            std::process::id(),
            id
        ));

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path.to_string_lossy())
    }

    /// Whether the database was opened with a SQLCipher key
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS questionnaires (
                id INTEGER PRIMARY KEY,
                owner TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'in_progress',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_questionnaires_owner ON questionnaires(owner);

            -- One row per (questionnaire, question); writes overwrite, no history
            CREATE TABLE IF NOT EXISTS questionnaire_answers (
                id INTEGER PRIMARY KEY,
                questionnaire_id INTEGER NOT NULL REFERENCES questionnaires(id) ON DELETE CASCADE,
                question_key TEXT NOT NULL,
                answer_json TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(questionnaire_id, question_key)
            );

            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                actor TEXT NOT NULL,
                action TEXT NOT NULL,
                subject TEXT NOT NULL,
                subject_id INTEGER,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        info!(path = %self.db_path, "Database migrations complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
