//! Writing and removing index rows.
//!
//! Every write goes to `search_items`; the FTS5 shadow follows through
//! triggers. Re-indexing an existing (account, scope, item) identity updates
//! its row in place.

use anyhow::Result;
use sqlx::{Row, SqliteConnection};

use crate::db::SearchDb;
use crate::extract::TextExtractor;
use crate::models::{IndexedRecord, SearchableItem};
use crate::normalize::normalize;

/// Current time in epoch milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Upsert one item.
///
/// The stored text is `normalize(extractor.extract(item))`; the timestamp is
/// the item's own `updated_at_ms`, or now when it has none.
pub async fn index_item(
    db: &SearchDb,
    item: &SearchableItem,
    extractor: &dyn TextExtractor,
) -> Result<()> {
    let pool = db.pool().await?;
    let mut conn = pool.acquire().await?;
    upsert_item(&mut conn, item, extractor).await
}

/// Upsert a batch of items in a single transaction. Returns how many were
/// written.
pub async fn index_items(
    db: &SearchDb,
    items: &[SearchableItem],
    extractor: &dyn TextExtractor,
) -> Result<usize> {
    let pool = db.pool().await?;
    let mut tx = pool.begin().await?;

    for item in items {
        upsert_item(&mut tx, item, extractor).await?;
    }

    tx.commit().await?;
    tracing::debug!(count = items.len(), "indexed batch");
    Ok(items.len())
}

/// Delete one item. Returns `false` when it was not indexed.
pub async fn remove_item(
    db: &SearchDb,
    account_id: &str,
    scope_id: &str,
    item_id: &str,
) -> Result<bool> {
    let pool = db.pool().await?;
    let result = sqlx::query(
        "DELETE FROM search_items WHERE account_id = ? AND scope_id = ? AND item_id = ?",
    )
    .bind(account_id)
    .bind(scope_id)
    .bind(item_id)
    .execute(pool)
    .await?;

    tracing::debug!(account_id, scope_id, item_id, "removed item");
    Ok(result.rows_affected() > 0)
}

/// Delete every item in a scope. Returns the number of rows removed.
pub async fn remove_scope(db: &SearchDb, account_id: &str, scope_id: &str) -> Result<u64> {
    let pool = db.pool().await?;
    let mut conn = pool.acquire().await?;
    let removed = delete_scope(&mut conn, account_id, scope_id).await?;

    tracing::info!(account_id, scope_id, removed, "removed scope");
    Ok(removed)
}

/// Fetch the stored row for one item, including its normalized text.
pub async fn get_record(
    db: &SearchDb,
    account_id: &str,
    scope_id: &str,
    item_id: &str,
) -> Result<Option<IndexedRecord>> {
    let pool = db.pool().await?;
    let row = sqlx::query(
        r#"
        SELECT account_id, scope_id, item_id, updated_at_ms, search_text
        FROM search_items
        WHERE account_id = ? AND scope_id = ? AND item_id = ?
        "#,
    )
    .bind(account_id)
    .bind(scope_id)
    .bind(item_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| IndexedRecord {
        account_id: r.get("account_id"),
        scope_id: r.get("scope_id"),
        item_id: r.get("item_id"),
        updated_at_ms: r.get("updated_at_ms"),
        search_text: r.get("search_text"),
    }))
}

pub(crate) async fn upsert_item(
    conn: &mut SqliteConnection,
    item: &SearchableItem,
    extractor: &dyn TextExtractor,
) -> Result<()> {
    let search_text = normalize(&extractor.extract(item));
    let updated_at_ms = item.updated_at_ms.unwrap_or_else(now_ms);

    sqlx::query(
        r#"
        INSERT INTO search_items (account_id, scope_id, item_id, updated_at_ms, search_text)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(account_id, scope_id, item_id) DO UPDATE SET
            updated_at_ms = excluded.updated_at_ms,
            search_text = excluded.search_text
        "#,
    )
    .bind(&item.account_id)
    .bind(&item.scope_id)
    .bind(&item.id)
    .bind(updated_at_ms)
    .bind(&search_text)
    .execute(&mut *conn)
    .await?;

    tracing::debug!(
        account_id = %item.account_id,
        scope_id = %item.scope_id,
        item_id = %item.id,
        "indexed item"
    );
    Ok(())
}

pub(crate) async fn delete_scope(
    conn: &mut SqliteConnection,
    account_id: &str,
    scope_id: &str,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM search_items WHERE account_id = ? AND scope_id = ?")
        .bind(account_id)
        .bind(scope_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
