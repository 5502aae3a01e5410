//! Core data types that flow through the index.
//!
//! [`SearchableItem`] comes in from calling code, [`IndexedRecord`] and
//! [`IndexState`] are what the database holds, and [`SearchResult`] is what
//! goes back out. Results carry identifiers only; callers re-fetch the full
//! record from the canonical store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record handed to the indexer. Never persisted as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchableItem {
    pub id: String,
    pub account_id: String,
    pub scope_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Any further string fields a custom extractor may want.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Last-modified time in the canonical store, epoch milliseconds.
    #[serde(default)]
    pub updated_at_ms: Option<i64>,
}

impl SearchableItem {
    pub fn new(
        account_id: impl Into<String>,
        scope_id: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            scope_id: scope_id.into(),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn updated_at_ms(mut self, ts: i64) -> Self {
        self.updated_at_ms = Some(ts);
        self
    }
}

/// One row of the content table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedRecord {
    pub account_id: String,
    pub scope_id: String,
    pub item_id: String,
    pub updated_at_ms: i64,
    pub search_text: String,
}

/// Per-scope rebuild bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexState {
    pub index_version: i64,
    pub last_rebuild_at_ms: i64,
}

/// A search hit. Deliberately excludes any field content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub item_id: String,
    pub account_id: String,
    pub scope_id: String,
    pub updated_at_ms: i64,
}

/// Summary of one (account, scope) partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeStats {
    pub account_id: String,
    pub scope_id: String,
    pub item_count: i64,
    pub newest_updated_at_ms: Option<i64>,
    pub state: Option<IndexState>,
}
