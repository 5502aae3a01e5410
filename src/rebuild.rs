//! Staleness detection and full scope rebuilds.
//!
//! A scope needs rebuilding when any of these hold:
//!
//! | Condition | Why |
//! |-----------|-----|
//! | an expected table is missing | schema corrupted or never created |
//! | no `index_state` row for the scope | never built |
//! | stored `index_version` < expected version | index format changed |
//!
//! Bumping [`INDEX_VERSION`] forces every scope to rebuild once.
//!
//! A rebuild replaces the scope wholesale: the clear, every re-insert, and
//! the state stamp run in one transaction, so readers see either the old
//! scope or the new one.

use anyhow::Result;
use sqlx::{Row, SqliteConnection};

use crate::db::{SearchDb, TableHealth};
use crate::extract::TextExtractor;
use crate::indexer::{delete_scope, now_ms, upsert_item};
use crate::models::{IndexState, SearchableItem};

/// Version of the stored index format.
pub const INDEX_VERSION: i64 = 1;

pub async fn get_index_state(
    db: &SearchDb,
    account_id: &str,
    scope_id: &str,
) -> Result<Option<IndexState>> {
    let pool = db.pool().await?;
    let row = sqlx::query(
        "SELECT index_version, last_rebuild_at_ms FROM index_state WHERE account_id = ? AND scope_id = ?",
    )
    .bind(account_id)
    .bind(scope_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| IndexState {
        index_version: r.get("index_version"),
        last_rebuild_at_ms: r.get("last_rebuild_at_ms"),
    }))
}

/// Upsert the scope's state row. `index_version` defaults to
/// [`INDEX_VERSION`]; the rebuild time is always now.
pub async fn update_index_state(
    db: &SearchDb,
    account_id: &str,
    scope_id: &str,
    index_version: Option<i64>,
) -> Result<()> {
    let pool = db.pool().await?;
    let mut conn = pool.acquire().await?;
    write_state(
        &mut conn,
        account_id,
        scope_id,
        index_version.unwrap_or(INDEX_VERSION),
    )
    .await
}

/// Decide whether a scope must be rebuilt. `expected_version` defaults to
/// [`INDEX_VERSION`].
pub async fn should_rebuild(
    db: &SearchDb,
    account_id: &str,
    scope_id: &str,
    expected_version: Option<i64>,
) -> Result<bool> {
    match db.check_tables().await {
        Ok(TableHealth::Healthy) => {}
        Ok(TableHealth::Corrupted { missing }) => {
            tracing::info!(account_id, scope_id, ?missing, "index tables missing, rebuild required");
            return Ok(true);
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check failed, treating index as missing");
            return Ok(true);
        }
    }

    let expected = expected_version.unwrap_or(INDEX_VERSION);
    let stale = match get_index_state(db, account_id, scope_id).await? {
        None => true,
        Some(state) => state.index_version < expected,
    };

    Ok(stale)
}

/// Replace a scope's rows with `items` and stamp a fresh state row.
///
/// Items whose account or scope differ from the target are skipped. When
/// the schema is corrupted it is reset first, which also drops every other
/// scope's state so those report stale in turn. Returns the number of items
/// indexed.
pub async fn rebuild_index(
    db: &SearchDb,
    account_id: &str,
    scope_id: &str,
    items: &[SearchableItem],
    extractor: &dyn TextExtractor,
) -> Result<usize> {
    if let TableHealth::Corrupted { missing } = db.check_tables().await? {
        tracing::warn!(?missing, "index schema corrupted, resetting before rebuild");
        db.reset().await?;
    }

    let pool = db.pool().await?;
    let mut tx = pool.begin().await?;

    let removed = delete_scope(&mut tx, account_id, scope_id).await?;

    let mut indexed = 0usize;
    for item in items {
        if item.account_id != account_id || item.scope_id != scope_id {
            tracing::warn!(
                item_id = %item.id,
                item_account = %item.account_id,
                item_scope = %item.scope_id,
                "skipping item outside rebuild scope"
            );
            continue;
        }
        upsert_item(&mut tx, item, extractor).await?;
        indexed += 1;
    }

    write_state(&mut tx, account_id, scope_id, INDEX_VERSION).await?;
    tx.commit().await?;

    tracing::info!(account_id, scope_id, removed, indexed, "rebuilt scope");
    Ok(indexed)
}

/// Rebuild only when [`should_rebuild`] says so. Returns whether a rebuild
/// happened.
pub async fn rebuild_if_needed(
    db: &SearchDb,
    account_id: &str,
    scope_id: &str,
    items: &[SearchableItem],
    extractor: &dyn TextExtractor,
) -> Result<bool> {
    if !should_rebuild(db, account_id, scope_id, None).await? {
        return Ok(false);
    }

    rebuild_index(db, account_id, scope_id, items, extractor).await?;
    Ok(true)
}

async fn write_state(
    conn: &mut SqliteConnection,
    account_id: &str,
    scope_id: &str,
    index_version: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO index_state (account_id, scope_id, index_version, last_rebuild_at_ms)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(account_id, scope_id) DO UPDATE SET
            index_version = excluded.index_version,
            last_rebuild_at_ms = excluded.last_rebuild_at_ms
        "#,
    )
    .bind(account_id)
    .bind(scope_id)
    .bind(index_version)
    .bind(now_ms())
    .execute(&mut *conn)
    .await?;

    Ok(())
}
