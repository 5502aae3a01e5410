//! SQLite connection and schema management.
//!
//! A [`SearchDb`] owns the connection pool to the on-device index file. It is
//! opened once by the application and passed by reference into every index
//! operation; clones share the same pool and the same schema flag.
//!
//! # Schema
//!
//! | Structure | Kind | Purpose |
//! |-----------|------|---------|
//! | `search_items` | table | one row per (account, scope, item) with normalized text |
//! | `search_items_fts` | FTS5, external content | token index over `search_items.search_text` |
//! | `index_state` | table | per-scope index version and last rebuild time |
//!
//! Three triggers (`search_items_ai`, `_ad`, `_au`) mirror every insert,
//! delete, and update of `search_items` into the FTS5 table within the same
//! statement, so the two never diverge. Updates issue the FTS5 `'delete'`
//! command for the old text before inserting the new text.
//!
//! Schema creation is idempotent and tracked separately from the pool:
//! [`SearchDb::raw_pool`] never creates anything, which lets
//! [`SearchDb::check_tables`] observe a missing schema instead of healing it.
//! Concurrent first uses of one handle wait on a shared lock, and the
//! statements themselves run in a single transaction.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::DbConfig;

pub const CONTENT_TABLE: &str = "search_items";
pub const SHADOW_TABLE: &str = "search_items_fts";
pub const STATE_TABLE: &str = "index_state";

/// The structures whose presence [`SearchDb::check_tables`] verifies.
pub const EXPECTED_TABLES: [&str; 3] = [CONTENT_TABLE, SHADOW_TABLE, STATE_TABLE];

/// Outcome of the catalog check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableHealth {
    Healthy,
    /// One or more expected structures are absent. Names are in
    /// [`EXPECTED_TABLES`] order.
    Corrupted { missing: Vec<String> },
}

impl TableHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, TableHealth::Healthy)
    }
}

/// Handle to the on-device search index database.
#[derive(Debug, Clone)]
pub struct SearchDb {
    pool: SqlitePool,
    schema_ready: Arc<AtomicBool>,
    schema_lock: Arc<Mutex<()>>,
}

impl SearchDb {
    /// Open (creating if needed) the database file at `config.path`.
    ///
    /// Parent directories are created, and WAL journal mode is enabled so
    /// searches can run while an index write is in progress. The schema is
    /// not created until the first call to [`SearchDb::pool`].
    pub async fn open(config: &DbConfig) -> Result<Self> {
        let db_path = &config.path;

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open search index: {}", db_path.display()))?;

        tracing::debug!(path = %db_path.display(), "opened search index");
        Ok(Self::from_pool(pool))
    }

    /// Open a private in-memory database.
    ///
    /// Every in-memory SQLite connection is its own database, so the pool is
    /// pinned to a single connection that is never reaped.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            schema_ready: Arc::new(AtomicBool::new(false)),
            schema_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The pool without any schema guarantee.
    pub fn raw_pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The pool, creating the schema first if this handle has not done so yet.
    pub async fn pool(&self) -> Result<&SqlitePool> {
        if !self.schema_ready.load(Ordering::Acquire) {
            self.ensure_schema().await?;
        }
        Ok(&self.pool)
    }

    pub fn schema_initialized(&self) -> bool {
        self.schema_ready.load(Ordering::Acquire)
    }

    /// Create every table, trigger, and index that does not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        let _guard = self.schema_lock.lock().await;
        self.create_all().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        let _guard = self.schema_lock.lock().await;
        // another task may have finished while we waited
        if self.schema_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        self.create_all().await
    }

    /// Caller holds `schema_lock`.
    async fn create_all(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        create_schema(&mut *tx).await?;
        tx.commit().await?;

        self.schema_ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Drop and recreate the whole schema. Every scope loses its rows and
    /// its index state.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.schema_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        for stmt in [
            "DROP TRIGGER IF EXISTS search_items_ai",
            "DROP TRIGGER IF EXISTS search_items_ad",
            "DROP TRIGGER IF EXISTS search_items_au",
            "DROP TABLE IF EXISTS search_items_fts",
            "DROP TABLE IF EXISTS search_items",
            "DROP TABLE IF EXISTS index_state",
        ] {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }

        create_schema(&mut *tx).await?;
        tx.commit().await?;

        self.schema_ready.store(true, Ordering::Release);
        tracing::info!("search index schema reset");
        Ok(())
    }

    /// Look up the expected structures in `sqlite_master`.
    ///
    /// Missing structures are reported as [`TableHealth::Corrupted`]; a
    /// failure to run the lookup at all is returned as an error.
    pub async fn check_tables(&self) -> Result<TableHealth> {
        let found: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN (?, ?, ?)",
        )
        .bind(CONTENT_TABLE)
        .bind(SHADOW_TABLE)
        .bind(STATE_TABLE)
        .fetch_all(&self.pool)
        .await?;

        let missing: Vec<String> = EXPECTED_TABLES
            .iter()
            .filter(|name| !found.iter().any(|f| f == *name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(TableHealth::Healthy)
        } else {
            Ok(TableHealth::Corrupted { missing })
        }
    }

    /// Boolean form of [`SearchDb::check_tables`]: storage faults count as
    /// "does not exist".
    pub async fn tables_exist(&self) -> bool {
        match self.check_tables().await {
            Ok(health) => health.is_healthy(),
            Err(e) => {
                tracing::warn!(error = %e, "search index health check failed");
                false
            }
        }
    }

    /// Close the pool. A later [`SearchDb::open`] starts from scratch.
    pub async fn close(self) {
        self.schema_ready.store(false, Ordering::Release);
        self.pool.close().await;
    }
}

async fn create_schema(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS search_items (
            account_id TEXT NOT NULL,
            scope_id TEXT NOT NULL,
            item_id TEXT NOT NULL,
            updated_at_ms INTEGER NOT NULL,
            search_text TEXT NOT NULL,
            PRIMARY KEY (account_id, scope_id, item_id)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE VIRTUAL TABLE IF NOT EXISTS search_items_fts USING fts5(
            search_text,
            content = 'search_items',
            content_rowid = 'rowid'
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS search_items_ai AFTER INSERT ON search_items BEGIN
            INSERT INTO search_items_fts(rowid, search_text)
            VALUES (new.rowid, new.search_text);
        END
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS search_items_ad AFTER DELETE ON search_items BEGIN
            INSERT INTO search_items_fts(search_items_fts, rowid, search_text)
            VALUES ('delete', old.rowid, old.search_text);
        END
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS search_items_au AFTER UPDATE ON search_items BEGIN
            INSERT INTO search_items_fts(search_items_fts, rowid, search_text)
            VALUES ('delete', old.rowid, old.search_text);
            INSERT INTO search_items_fts(rowid, search_text)
            VALUES (new.rowid, new.search_text);
        END
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS index_state (
            account_id TEXT NOT NULL,
            scope_id TEXT NOT NULL,
            index_version INTEGER NOT NULL,
            last_rebuild_at_ms INTEGER NOT NULL,
            PRIMARY KEY (account_id, scope_id)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_search_items_scope ON search_items(account_id, scope_id)",
    )
    .execute(&mut *conn)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_search_items_updated_at ON search_items(updated_at_ms DESC)",
    )
    .execute(&mut *conn)
    .await?;

    tracing::debug!("search index schema ensured");
    Ok(())
}
