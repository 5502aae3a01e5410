//! Keyword search over a single (account, scope) partition.
//!
//! # Matching
//!
//! The query is trimmed and lowercased, split on whitespace, and every token
//! becomes an FTS5 quoted string. Tokens are joined with `OR`, so an item
//! matches when *any* token appears in its text. Quoting keeps punctuation
//! such as the hyphen in `bfl-001` from being read as query syntax.
//!
//! # Ordering
//!
//! Candidates are ranked by BM25 (`rank`) and capped at `limit` inside
//! SQLite. The surviving rows are then returned most-recently-updated first.

use anyhow::Result;
use sqlx::Row;

use crate::db::SearchDb;
use crate::models::SearchResult;

pub const DEFAULT_LIMIT: i64 = 100;

/// Build the FTS5 `MATCH` expression for a raw query.
///
/// Returns `None` when the query has no token containing a letter or digit.
pub fn build_match_expression(query: &str) -> Option<String> {
    let lowered = query.trim().to_lowercase();

    let terms: Vec<String> = lowered
        .split_whitespace()
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Search one scope. An empty or blank query returns no results without
/// touching the database.
pub async fn search(
    db: &SearchDb,
    account_id: &str,
    scope_id: &str,
    query: &str,
    limit: i64,
) -> Result<Vec<SearchResult>> {
    if query.trim().is_empty() || limit < 1 {
        return Ok(Vec::new());
    }

    let match_expr = match build_match_expression(query) {
        Some(expr) => expr,
        None => return Ok(Vec::new()),
    };

    let pool = db.pool().await?;
    let rows = sqlx::query(
        r#"
        SELECT s.item_id, s.account_id, s.scope_id, s.updated_at_ms
        FROM (
            SELECT rowid, rank
            FROM search_items_fts
            WHERE search_items_fts MATCH ?
              AND rowid IN (
                  SELECT rowid FROM search_items
                  WHERE account_id = ? AND scope_id = ?
              )
            ORDER BY rank
            LIMIT ?
        ) AS m
        JOIN search_items s ON s.rowid = m.rowid
        ORDER BY s.updated_at_ms DESC, m.rank
        "#,
    )
    .bind(&match_expr)
    .bind(account_id)
    .bind(scope_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let results: Vec<SearchResult> = rows
        .iter()
        .map(|row| SearchResult {
            item_id: row.get("item_id"),
            account_id: row.get("account_id"),
            scope_id: row.get("scope_id"),
            updated_at_ms: row.get("updated_at_ms"),
        })
        .collect();

    tracing::debug!(account_id, scope_id, query = %match_expr, hits = results.len(), "search");
    Ok(results)
}

/// Every indexed item id in a scope, unranked.
pub async fn get_all_item_ids(db: &SearchDb, account_id: &str, scope_id: &str) -> Result<Vec<String>> {
    let pool = db.pool().await?;
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT item_id FROM search_items WHERE account_id = ? AND scope_id = ? ORDER BY item_id",
    )
    .bind(account_id)
    .bind(scope_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
