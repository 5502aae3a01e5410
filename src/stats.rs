//! Per-scope index statistics.
//!
//! Gives a quick view of what's indexed: item counts, the newest
//! `updated_at_ms`, and each scope's rebuild state. Scopes that were rebuilt
//! from an empty snapshot still appear, with a count of zero.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::SearchDb;
use crate::models::{IndexState, ScopeStats};
use crate::rebuild::get_index_state;

/// Statistics for one scope.
pub async fn scope_stats(db: &SearchDb, account_id: &str, scope_id: &str) -> Result<ScopeStats> {
    let pool = db.pool().await?;
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS item_count, MAX(updated_at_ms) AS newest
        FROM search_items
        WHERE account_id = ? AND scope_id = ?
        "#,
    )
    .bind(account_id)
    .bind(scope_id)
    .fetch_one(pool)
    .await?;

    Ok(ScopeStats {
        account_id: account_id.to_string(),
        scope_id: scope_id.to_string(),
        item_count: row.get("item_count"),
        newest_updated_at_ms: row.get("newest"),
        state: get_index_state(db, account_id, scope_id).await?,
    })
}

/// Statistics for every scope that has items or a state row, ordered by
/// account then scope.
pub async fn all_scopes(db: &SearchDb) -> Result<Vec<ScopeStats>> {
    let pool = db.pool().await?;
    let rows = sqlx::query(
        r#"
        SELECT
            k.account_id,
            k.scope_id,
            COUNT(s.item_id) AS item_count,
            MAX(s.updated_at_ms) AS newest,
            st.index_version,
            st.last_rebuild_at_ms
        FROM (
            SELECT account_id, scope_id FROM search_items
            UNION
            SELECT account_id, scope_id FROM index_state
        ) AS k
        LEFT JOIN search_items s
            ON s.account_id = k.account_id AND s.scope_id = k.scope_id
        LEFT JOIN index_state st
            ON st.account_id = k.account_id AND st.scope_id = k.scope_id
        GROUP BY k.account_id, k.scope_id
        ORDER BY k.account_id, k.scope_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_stats).collect())
}

fn row_to_stats(row: &SqliteRow) -> ScopeStats {
    let version: Option<i64> = row.get("index_version");
    let last_rebuild: Option<i64> = row.get("last_rebuild_at_ms");

    ScopeStats {
        account_id: row.get("account_id"),
        scope_id: row.get("scope_id"),
        item_count: row.get("item_count"),
        newest_updated_at_ms: row.get("newest"),
        state: version.zip(last_rebuild).map(|(index_version, last_rebuild_at_ms)| IndexState {
            index_version,
            last_rebuild_at_ms,
        }),
    }
}
