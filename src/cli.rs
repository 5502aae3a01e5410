//! Command implementations behind the `shelf` binary.
//!
//! Each `run_*` function opens the configured database, performs one
//! operation, prints a plain-text report to stdout, and closes the handle.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::db::{SearchDb, TableHealth};
use crate::index::SearchIndex;
use crate::models::SearchableItem;
use crate::rebuild;
use crate::stats;

/// Read a JSON array of items.
pub fn load_items(path: &Path) -> Result<Vec<SearchableItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read items file: {}", path.display()))?;
    let items: Vec<SearchableItem> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse items file: {}", path.display()))?;
    Ok(items)
}

fn format_ms(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn result_line(item_id: &str, updated_at_ms: i64) -> String {
    format!("{}  {}", item_id, format_ms(updated_at_ms))
}

async fn open_index(config: &Config) -> Result<SearchIndex> {
    let db = SearchDb::open(&config.db).await?;
    Ok(SearchIndex::from_config(db, config))
}

pub async fn run_init(config: &Config) -> Result<()> {
    let db = SearchDb::open(&config.db).await?;
    db.init_schema().await?;
    db.close().await;
    println!("Search index initialized.");
    Ok(())
}

pub async fn run_index(config: &Config, items_path: &Path) -> Result<()> {
    let items = load_items(items_path)?;
    let index = open_index(config).await?;
    let count = index.index_all(&items).await?;
    index.close().await;

    println!("indexed: {}", count);
    Ok(())
}

pub async fn run_remove(
    config: &Config,
    account_id: &str,
    scope_id: &str,
    item_id: Option<&str>,
) -> Result<()> {
    let index = open_index(config).await?;

    match item_id {
        Some(id) => {
            let removed = index.remove(account_id, scope_id, id).await?;
            if removed {
                println!("removed: {}", id);
            } else {
                println!("not indexed: {}", id);
            }
        }
        None => {
            let removed = index.remove_scope(account_id, scope_id).await?;
            println!("removed {} items from {}/{}", removed, account_id, scope_id);
        }
    }

    index.close().await;
    Ok(())
}

pub async fn run_search(
    config: &Config,
    account_id: &str,
    scope_id: &str,
    query: &str,
    limit: Option<i64>,
) -> Result<()> {
    let index = open_index(config).await?;
    let limit = limit.unwrap_or(config.search.default_limit);
    let results = index
        .search_with_limit(account_id, scope_id, query, limit)
        .await?;
    index.close().await;

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for result in &results {
        println!("{}", result_line(&result.item_id, result.updated_at_ms));
    }
    Ok(())
}

pub async fn run_ids(config: &Config, account_id: &str, scope_id: &str) -> Result<()> {
    let index = open_index(config).await?;
    let ids = index.item_ids(account_id, scope_id).await?;
    index.close().await;

    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

pub async fn run_rebuild(
    config: &Config,
    account_id: &str,
    scope_id: &str,
    items_path: &Path,
    if_needed: bool,
) -> Result<()> {
    let items = load_items(items_path)?;
    let index = open_index(config).await?;

    if if_needed && !index.should_rebuild(account_id, scope_id).await? {
        index.close().await;
        println!("up to date");
        return Ok(());
    }

    let count = index.rebuild(account_id, scope_id, &items).await?;
    index.close().await;

    println!("rebuilt: {} items", count);
    Ok(())
}

pub async fn run_check(config: &Config, scope: Option<(&str, &str)>) -> Result<()> {
    let db = SearchDb::open(&config.db).await?;

    match db.check_tables().await {
        Ok(TableHealth::Healthy) => println!("tables: ok"),
        Ok(TableHealth::Corrupted { missing }) => {
            println!("tables: missing {}", missing.join(", "))
        }
        Err(e) => println!("tables: unreadable ({})", e),
    }

    if let Some((account_id, scope_id)) = scope {
        let stale = rebuild::should_rebuild(&db, account_id, scope_id, None).await?;
        println!(
            "{}/{}: {}",
            account_id,
            scope_id,
            if stale { "rebuild required" } else { "up to date" }
        );
    }

    db.close().await;
    Ok(())
}

pub async fn run_stats(config: &Config) -> Result<()> {
    let db = SearchDb::open(&config.db).await?;
    let scopes = stats::all_scopes(&db).await?;
    db.close().await;

    println!("Shelf Index: Scope Stats");
    println!("=========================");
    println!();
    println!("  Database: {}", config.db.path.display());
    println!();

    if scopes.is_empty() {
        println!("  No indexed scopes.");
        return Ok(());
    }

    for s in &scopes {
        let newest = s
            .newest_updated_at_ms
            .map(format_ms)
            .unwrap_or_else(|| "never".to_string());
        let state = match s.state {
            Some(st) => format!(
                "v{} rebuilt {}",
                st.index_version,
                format_ms(st.last_rebuild_at_ms)
            ),
            None => "never rebuilt".to_string(),
        };
        println!(
            "  {}/{}  items: {}  newest: {}  state: {}",
            s.account_id, s.scope_id, s.item_count, newest, state
        );
    }
    Ok(())
}

pub async fn run_reset(config: &Config) -> Result<()> {
    let db = SearchDb::open(&config.db).await?;
    db.reset().await?;
    db.close().await;
    println!("Search index reset.");
    Ok(())
}
