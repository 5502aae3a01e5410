//! The search index facade.
//!
//! [`SearchIndex`] binds a [`SearchDb`] to one [`TextExtractor`] so calling
//! code can index, remove, search, and rebuild without threading the
//! extraction policy through every call site.
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use shelf_index::{SearchDb, SearchIndex, SearchableItem};
//!
//! let db = SearchDb::open_in_memory().await?;
//! let index = SearchIndex::new(db);
//!
//! let lamp = SearchableItem::new("acct", "inventory", "i1")
//!     .name("Brass Floor Lamp")
//!     .sku("BFL-001");
//! index.index(&lamp).await?;
//!
//! let hits = index.search("acct", "inventory", "brass").await?;
//! assert_eq!(hits[0].item_id, "i1");
//! # Ok(())
//! # }
//! ```

use anyhow::Result;

use crate::config::Config;
use crate::db::SearchDb;
use crate::extract::{DefaultExtractor, TextExtractor};
use crate::indexer;
use crate::models::{SearchResult, SearchableItem};
use crate::rebuild;
use crate::search::{self, DEFAULT_LIMIT};

pub struct SearchIndex<E = DefaultExtractor> {
    db: SearchDb,
    extractor: E,
    default_limit: i64,
}

impl SearchIndex<DefaultExtractor> {
    /// Facade using the default field policy.
    pub fn new(db: SearchDb) -> Self {
        Self::with_extractor(db, DefaultExtractor::new())
    }

    /// Facade configured from the `[search]` section.
    pub fn from_config(db: SearchDb, config: &Config) -> Self {
        let extractor = DefaultExtractor::new().strip_punctuation(config.search.strip_punctuation);
        Self::with_extractor(db, extractor).default_limit(config.search.default_limit)
    }
}

impl<E: TextExtractor> SearchIndex<E> {
    pub fn with_extractor(db: SearchDb, extractor: E) -> Self {
        Self {
            db,
            extractor,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Result cap used by [`SearchIndex::search`].
    pub fn default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn db(&self) -> &SearchDb {
        &self.db
    }

    /// Close the underlying database handle.
    pub async fn close(self) {
        self.db.close().await;
    }

    pub async fn index(&self, item: &SearchableItem) -> Result<()> {
        indexer::index_item(&self.db, item, &self.extractor).await
    }

    pub async fn index_all(&self, items: &[SearchableItem]) -> Result<usize> {
        indexer::index_items(&self.db, items, &self.extractor).await
    }

    pub async fn remove(&self, account_id: &str, scope_id: &str, item_id: &str) -> Result<bool> {
        indexer::remove_item(&self.db, account_id, scope_id, item_id).await
    }

    pub async fn remove_scope(&self, account_id: &str, scope_id: &str) -> Result<u64> {
        indexer::remove_scope(&self.db, account_id, scope_id).await
    }

    pub async fn search(
        &self,
        account_id: &str,
        scope_id: &str,
        query: &str,
    ) -> Result<Vec<SearchResult>> {
        search::search(&self.db, account_id, scope_id, query, self.default_limit).await
    }

    pub async fn search_with_limit(
        &self,
        account_id: &str,
        scope_id: &str,
        query: &str,
        limit: i64,
    ) -> Result<Vec<SearchResult>> {
        search::search(&self.db, account_id, scope_id, query, limit).await
    }

    pub async fn item_ids(&self, account_id: &str, scope_id: &str) -> Result<Vec<String>> {
        search::get_all_item_ids(&self.db, account_id, scope_id).await
    }

    pub async fn should_rebuild(&self, account_id: &str, scope_id: &str) -> Result<bool> {
        rebuild::should_rebuild(&self.db, account_id, scope_id, None).await
    }

    pub async fn rebuild(
        &self,
        account_id: &str,
        scope_id: &str,
        items: &[SearchableItem],
    ) -> Result<usize> {
        rebuild::rebuild_index(&self.db, account_id, scope_id, items, &self.extractor).await
    }

    pub async fn rebuild_if_needed(
        &self,
        account_id: &str,
        scope_id: &str,
        items: &[SearchableItem],
    ) -> Result<bool> {
        rebuild::rebuild_if_needed(&self.db, account_id, scope_id, items, &self.extractor).await
    }
}
